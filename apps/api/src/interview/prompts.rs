// Opening instructions for the mock interviewer, one per interview source.

/// Shared tail of every briefing. Ends with the phrase the state machine
/// watches for (`machine::COMPLETION_MARKER`).
pub const INTERVIEW_PROTOCOL: &str = "Conduct a mock interview, ask one question at a time, \
and after each answer, analyze and ask the next question. \
After the interview, provide a score out of 10 with feedback. \
Say 'Interview finished' when done.";

pub fn resume_briefing(position: &str, company: &str, resume_text: &str) -> String {
    format!(
        "Act as an interviewer for the position of {position} at {company}. \
Use the following resume:\n{resume_text}\n{INTERVIEW_PROTOCOL}"
    )
}

pub fn career_path_briefing(career_path: &str) -> String {
    format!(
        "Act as an interviewer for the following suggested career path:\n{career_path}\n{INTERVIEW_PROTOCOL}"
    )
}

pub fn roadmap_briefing(roadmap: &str) -> String {
    format!("Act as an interviewer for the following learning roadmap:\n{roadmap}\n{INTERVIEW_PROTOCOL}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::machine::marks_completion;

    #[test]
    fn test_resume_briefing_embeds_position_company_and_resume() {
        let briefing = resume_briefing("Backend Engineer", "Acme", "10 years of Go");
        assert!(briefing.starts_with("Act as an interviewer for the position of Backend Engineer at Acme."));
        assert!(briefing.contains("Use the following resume:\n10 years of Go\n"));
        assert!(briefing.ends_with(INTERVIEW_PROTOCOL));
    }

    #[test]
    fn test_source_briefings_embed_previous_results() {
        let career = career_path_briefing("1. Data Engineer");
        assert!(career.contains("suggested career path:\n1. Data Engineer\n"));

        let roadmap = roadmap_briefing("Week 1: SQL");
        assert!(roadmap.contains("learning roadmap:\nWeek 1: SQL\n"));
    }

    #[test]
    fn test_protocol_asks_for_score_and_marker() {
        assert!(INTERVIEW_PROTOCOL.contains("score out of 10"));
        assert!(INTERVIEW_PROTOCOL.contains("one question at a time"));
        assert!(marks_completion(INTERVIEW_PROTOCOL));
    }
}
