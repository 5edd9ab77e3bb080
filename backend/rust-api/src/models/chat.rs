use serde::{Deserialize, Serialize};

/// Body of POST /api/gemini-chat. `message` defaults to empty so a missing
/// field and an empty string reject the same way.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<IncomingHistoryEntry>,
}

/// One history entry as clients actually send it: `parts` may be a proper
/// part list, a list of bare strings, or a single string.
#[derive(Debug, Deserialize)]
pub struct IncomingHistoryEntry {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parts: PartsField,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PartsField {
    Many(Vec<IncomingPart>),
    One(String),
}

impl Default for PartsField {
    fn default() -> Self {
        PartsField::Many(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IncomingPart {
    Text { text: String },
    Plain(String),
    Other(serde_json::Value),
}

/// Normalized turn in the upstream wire shape.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: String,
    pub parts: Vec<ChatPart>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatPart {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}
