//! Mock interview driver. Moves an `InterviewSession` through its states,
//! calling the oracle whenever a question is due.
//!
//! Outer `Result`: the action itself was invalid (wrong state, missing source).
//! Inner `Result`: the oracle's outcome, which the caller renders as content.

use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::machine::{
    InterviewContext, InterviewEvent, InterviewSession, InterviewState, InvalidTransition,
};
use crate::interview::prompts::{career_path_briefing, resume_briefing, roadmap_briefing};
use crate::llm_client::{CompletionError, Oracle};
use crate::session::SessionContext;

/// Where the interviewer's briefing material comes from.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum InterviewSource {
    Resume {
        #[serde(default)]
        resume_text: String,
        #[serde(default)]
        position: String,
        #[serde(default)]
        company: String,
    },
    CareerPath,
    Roadmap,
}

pub type QuestionOutcome = Result<(), CompletionError>;

/// Builds the opening briefing. The career-path and roadmap sources need a
/// previous successful result in the same session.
pub fn briefing_for(
    session: &SessionContext,
    source: &InterviewSource,
) -> Result<(InterviewContext, String), AppError> {
    match source {
        InterviewSource::Resume {
            resume_text,
            position,
            company,
        } => Ok((
            InterviewContext::Resume,
            resume_briefing(position, company, resume_text),
        )),
        InterviewSource::CareerPath => session
            .last_career_path
            .as_deref()
            .map(|path| (InterviewContext::CareerPath, career_path_briefing(path)))
            .ok_or_else(|| {
                AppError::Validation(
                    "No career path suggestion found. Please use the 'Career Path Suggestions' tab first."
                        .to_string(),
                )
            }),
        InterviewSource::Roadmap => session
            .last_roadmap
            .as_deref()
            .map(|roadmap| (InterviewContext::Roadmap, roadmap_briefing(roadmap)))
            .ok_or_else(|| {
                AppError::Validation(
                    "No learning roadmap found. Please use the 'Learning Roadmap Generator' tab first."
                        .to_string(),
                )
            }),
    }
}

/// Starts an interview and immediately asks for the first question.
///
/// If that first oracle call fails, the interview stays in `AwaitingQuestion`
/// and the caller can retry with `next_question`.
pub async fn start(
    session: &mut SessionContext,
    source: &InterviewSource,
    oracle: &dyn Oracle,
) -> Result<QuestionOutcome, AppError> {
    let (context, briefing) = briefing_for(session, source)?;
    session
        .interview
        .transition(InterviewEvent::Start { context, briefing })?;
    info!("Session {} started a {:?} interview", session.id, context);

    Ok(next_question(&mut session.interview, oracle).await?)
}

/// Sends the whole conversation so far and records the reply as the next
/// interviewer turn. Only valid in `AwaitingQuestion`.
pub async fn next_question(
    interview: &mut InterviewSession,
    oracle: &dyn Oracle,
) -> Result<QuestionOutcome, InvalidTransition> {
    if interview.state() != InterviewState::AwaitingQuestion {
        return Err(InvalidTransition {
            state: interview.state(),
            event: "request the next question",
        });
    }

    let conversation = interview.conversation();
    match oracle.complete(&conversation).await {
        Ok(question) => {
            let state = interview.transition(InterviewEvent::QuestionReceived(question))?;
            info!("Interview question {} received, now {:?}", interview.step(), state);
            Ok(Ok(()))
        }
        Err(e) => {
            warn!("Interview question request failed at step {}: {}", interview.step(), e);
            Ok(Err(e))
        }
    }
}

pub fn submit_answer(
    interview: &mut InterviewSession,
    answer: String,
) -> Result<InterviewState, InvalidTransition> {
    interview.transition(InterviewEvent::AnswerSubmitted(answer))
}

pub fn reset(interview: &mut InterviewSession) -> InterviewState {
    // Reset is accepted from every state.
    interview
        .transition(InterviewEvent::Reset)
        .unwrap_or(InterviewState::Empty)
}
