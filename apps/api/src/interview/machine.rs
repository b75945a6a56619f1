//! Mock interview state machine.
//!
//! ```text
//! Empty ──Start──▶ AwaitingQuestion ──QuestionReceived──▶ AwaitingAnswer
//!                        ▲                   │                  │
//!                        └──AnswerSubmitted──┼──────────────────┘
//!                                            ▼
//!                                        Finished
//! Reset: any state ──▶ Empty
//! ```
//!
//! Pure and synchronous. The oracle round-trip lives in `interview::service`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::ChatMessage;

/// Case-insensitive phrase that ends the interview when it appears in an interviewer turn.
pub const COMPLETION_MARKER: &str = "interview finished";

/// Which source material the interview was started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewContext {
    Resume,
    CareerPath,
    Roadmap,
}

/// One exchanged message, tagged by speaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "speaker", content = "text", rename_all = "snake_case")]
pub enum Turn {
    Interviewer(String),
    Candidate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewState {
    Empty,
    AwaitingQuestion,
    AwaitingAnswer,
    Finished,
}

impl fmt::Display for InterviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InterviewState::Empty => "not started",
            InterviewState::AwaitingQuestion => "waiting for the next question",
            InterviewState::AwaitingAnswer => "waiting for an answer",
            InterviewState::Finished => "finished",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The interviewer emitted the completion marker.
    Marker,
    /// The question cap was reached without a marker.
    TurnLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterviewEvent {
    Start {
        context: InterviewContext,
        briefing: String,
    },
    QuestionReceived(String),
    AnswerSubmitted(String),
    Reset,
}

impl InterviewEvent {
    fn name(&self) -> &'static str {
        match self {
            InterviewEvent::Start { .. } => "start an interview",
            InterviewEvent::QuestionReceived(_) => "record a question",
            InterviewEvent::AnswerSubmitted(_) => "submit an answer",
            InterviewEvent::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Cannot {event} while the interview is {state}")]
pub struct InvalidTransition {
    pub state: InterviewState,
    pub event: &'static str,
}

/// True when `text` carries the completion marker, ignoring case.
pub fn marks_completion(text: &str) -> bool {
    text.to_lowercase().contains(COMPLETION_MARKER)
}

/// Transcript and progress of one mock interview.
///
/// `turns` is append-only and alternates Interviewer, Candidate, Interviewer, …
/// `step` always equals the number of interviewer turns.
#[derive(Debug, Clone)]
pub struct InterviewSession {
    state: InterviewState,
    context: Option<InterviewContext>,
    briefing: Option<String>,
    turns: Vec<Turn>,
    step: u32,
    finish_reason: Option<FinishReason>,
    /// `None` leaves termination entirely to the completion marker.
    max_questions: Option<u32>,
}

impl InterviewSession {
    pub fn new(max_questions: Option<u32>) -> Self {
        Self {
            state: InterviewState::Empty,
            context: None,
            briefing: None,
            turns: Vec::new(),
            step: 0,
            finish_reason: None,
            max_questions,
        }
    }

    pub fn state(&self) -> InterviewState {
        self.state
    }

    pub fn context(&self) -> Option<InterviewContext> {
        self.context
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    pub fn is_finished(&self) -> bool {
        self.state == InterviewState::Finished
    }

    /// The most recent interviewer turn, if the last turn is one.
    pub fn latest_question(&self) -> Option<&str> {
        match self.turns.last() {
            Some(Turn::Interviewer(text)) => Some(text),
            _ => None,
        }
    }

    /// The conversation sent to the oracle: the briefing as the opening user
    /// message, followed by every turn in order.
    pub fn conversation(&self) -> Vec<ChatMessage> {
        let briefing = self.briefing.iter().map(|b| ChatMessage::user(b.as_str()));
        let turns = self.turns.iter().map(|turn| match turn {
            Turn::Interviewer(text) => ChatMessage::assistant(text.as_str()),
            Turn::Candidate(text) => ChatMessage::user(text.as_str()),
        });
        briefing.chain(turns).collect()
    }

    /// The single transition function. On error the session is left untouched.
    pub fn transition(&mut self, event: InterviewEvent) -> Result<InterviewState, InvalidTransition> {
        let next = match (self.state, event) {
            (_, InterviewEvent::Reset) => {
                self.context = None;
                self.briefing = None;
                self.turns.clear();
                self.step = 0;
                self.finish_reason = None;
                InterviewState::Empty
            }
            (InterviewState::Empty, InterviewEvent::Start { context, briefing }) => {
                self.context = Some(context);
                self.briefing = Some(briefing);
                InterviewState::AwaitingQuestion
            }
            (InterviewState::AwaitingQuestion, InterviewEvent::QuestionReceived(text)) => {
                let done = marks_completion(&text);
                self.turns.push(Turn::Interviewer(text));
                self.step += 1;
                if done {
                    self.finish_reason = Some(FinishReason::Marker);
                    InterviewState::Finished
                } else if self.max_questions.is_some_and(|cap| self.step >= cap) {
                    self.finish_reason = Some(FinishReason::TurnLimit);
                    InterviewState::Finished
                } else {
                    InterviewState::AwaitingAnswer
                }
            }
            (InterviewState::AwaitingAnswer, InterviewEvent::AnswerSubmitted(text)) => {
                self.turns.push(Turn::Candidate(text));
                InterviewState::AwaitingQuestion
            }
            (state, event) => {
                return Err(InvalidTransition {
                    state,
                    event: event.name(),
                })
            }
        };
        self.state = next;
        Ok(next)
    }
}
