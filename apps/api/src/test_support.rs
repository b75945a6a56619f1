//! Test doubles shared by unit and router tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{ChatMessage, CompletionError, Oracle};

enum Scripted {
    Reply(String),
    Failure { status: u16, message: String },
}

/// Oracle that plays back queued replies in order and records every conversation it receives.
/// Running out of script is reported as a malformed response.
#[derive(Default)]
pub struct ScriptedOracle {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replies(replies: &[&str]) -> Self {
        let oracle = Self::new();
        for reply in replies {
            oracle.push_reply(reply);
        }
        oracle
    }

    pub fn push_reply(&self, text: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Reply(text.to_string()));
    }

    pub fn push_failure(&self, status: u16, message: &str) {
        self.script.lock().unwrap().push_back(Scripted::Failure {
            status,
            message: message.to_string(),
        });
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Failure { status, message }) => Err(CompletionError::Api { status, message }),
            None => Err(CompletionError::MalformedResponse("script exhausted".to_string())),
        }
    }
}
