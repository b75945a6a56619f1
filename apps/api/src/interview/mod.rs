// Mock interview: an explicit state machine, the briefings that open it,
// and the driver that asks the oracle for each question.

pub mod handlers;
pub mod machine;
pub mod prompts;
pub mod service;
