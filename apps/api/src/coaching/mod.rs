// Single-shot coaching panels: career paths, learning roadmap, résumé feedback.
// Each builds one prompt, makes one oracle call and returns the reply as-is.

pub mod handlers;
pub mod prompts;
