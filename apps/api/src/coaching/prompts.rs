// Prompt templates for the three single-shot coaching panels.
// User fields are interpolated verbatim: no trimming, truncation or escaping.

/// Career coach prompt asking for exactly three career paths with reasons.
pub fn career_path_prompt(skills: &str, interests: &str, education: &str, experience: &str) -> String {
    format!(
        "I am a career coach. Analyze the following user skills and suggest 3 suitable career paths with reasons for each.
Skills: {skills}
Interests: {interests}
Education: {education}
Experience: {experience}
"
    )
}

/// Three-month, week-by-week learning plan toward `goal`.
pub fn roadmap_prompt(skills: &str, goal: &str) -> String {
    format!(
        "Based on the user's current skills: {skills} and their goal to become a {goal},
generate a 3-month weekly learning roadmap including:
- Skills to learn
- Recommended online resources
- Project ideas
"
    )
}

pub fn resume_feedback_prompt(resume_text: &str, job_role: &str) -> String {
    format!(
        "You are an expert resume reviewer. Review this resume and suggest:
- Key improvements
- Missing skills or experience
- Summary and formatting suggestions
Resume:
{resume_text}
Job Role: {job_role}
"
    )
}
