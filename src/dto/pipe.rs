use crate::engine::message::Message;
use serde::{Deserialize, Serialize};

/// One line of `pipe` input.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipeRequest {
    Input { text: String },
    Restart,
    Menu,
    Transcript,
}

impl PipeRequest {
    pub fn parse(line: &str) -> Result<Self, PipeError> {
        serde_json::from_str(line).map_err(|e| PipeError::new(format!("Invalid request: {}", e)))
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PipeError {
    pub error: String,
}

impl PipeError {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

#[derive(Debug, Serialize)]
pub struct TranscriptDump<'a> {
    pub transcript: &'a [Message],
}
