use serde_json::Value;
use thiserror::Error;

use crate::{
    metrics::{CHAT_HISTORY_DROPPED_TOTAL, CHAT_REQUESTS_TOTAL},
    models::chat::{
        ChatPart, ChatRequest, ChatResponse, ChatTurn, IncomingHistoryEntry, IncomingPart,
        PartsField,
    },
    services::AppState,
};

const UPSTREAM_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ChatRelayError {
    #[error("Message is required")]
    MissingMessage,
    #[error("Response blocked due to: {reason}")]
    Blocked { reason: String, details: Value },
    #[error("Gemini API Backend Error: {message}")]
    Upstream { message: String, details: Value },
}

/// Relay to the Gemini generateContent endpoint. Holds no connection state;
/// a client is built per call, as with the other outbound HTTP paths.
pub struct ChatService {
    endpoint: String,
    model: String,
    api_key: String,
}

impl ChatService {
    pub fn new(state: &AppState) -> Self {
        Self {
            endpoint: state.config.gemini_endpoint.clone(),
            model: state.config.gemini_model.clone(),
            api_key: state.config.gemini_api_key.clone(),
        }
    }

    pub async fn relay(&self, request: ChatRequest) -> Result<ChatResponse, ChatRelayError> {
        let result = self.relay_inner(request).await;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(ChatRelayError::MissingMessage) => "rejected",
            Err(ChatRelayError::Blocked { .. }) => "blocked",
            Err(ChatRelayError::Upstream { .. }) => "error",
        };
        CHAT_REQUESTS_TOTAL.with_label_values(&[outcome]).inc();
        result
    }

    async fn relay_inner(&self, request: ChatRequest) -> Result<ChatResponse, ChatRelayError> {
        if request.message.trim().is_empty() {
            return Err(ChatRelayError::MissingMessage);
        }

        let (mut contents, dropped) = normalize_history(request.history);
        if dropped > 0 {
            tracing::warn!("Dropped {} malformed chat history entries", dropped);
            CHAT_HISTORY_DROPPED_TOTAL.inc_by(dropped as u64);
        }
        contents.push(ChatTurn {
            role: "user".to_string(),
            parts: vec![ChatPart {
                text: request.message,
            }],
        });

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        );

        let body = serde_json::json!({
            "contents": contents,
            "safetySettings": [
                { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
                { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
                { "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
                { "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
            ],
            "generationConfig": { "temperature": 0.1 },
        });

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
            .build()
            .map_err(|error| upstream(error.to_string()))?;

        let response = client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|error| upstream(error.to_string()))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|error| upstream(format!("Failed to parse Gemini response: {}", error)))?;

        // Safety blocks come back as a successful response with a
        // promptFeedback block reason and no candidates.
        if let Some(reason) = payload
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
        {
            return Err(ChatRelayError::Blocked {
                reason: reason.to_string(),
                details: payload
                    .get("promptFeedback")
                    .cloned()
                    .unwrap_or(Value::Null),
            });
        }

        if !status.is_success() {
            return Err(ChatRelayError::Upstream {
                message: format!("Gemini API returned status: {}", status),
                details: payload,
            });
        }

        let reply = payload
            .pointer("/candidates/0/content/parts")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if reply.is_empty() {
            return Err(ChatRelayError::Upstream {
                message: "Gemini response contained no text".to_string(),
                details: payload,
            });
        }

        Ok(ChatResponse { reply })
    }
}

fn upstream(message: String) -> ChatRelayError {
    ChatRelayError::Upstream {
        message,
        details: Value::Null,
    }
}

/// Coerces client-sent history into Gemini turns. The `parts` field may be a
/// bare string, `{ text }` objects, or bare strings inside the list; an entry
/// carrying any other part shape is dropped whole. Returns the turns and the
/// number of dropped entries.
pub fn normalize_history(history: Vec<IncomingHistoryEntry>) -> (Vec<ChatTurn>, usize) {
    let mut turns = Vec::with_capacity(history.len());
    let mut dropped = 0;

    for entry in history {
        let role = if entry.role.is_empty() {
            "user".to_string()
        } else {
            entry.role
        };

        let parts = match entry.parts {
            PartsField::One(text) => vec![ChatPart { text }],
            PartsField::Many(parts) => {
                let mut collected = Vec::with_capacity(parts.len());
                let mut malformed = false;
                for part in parts {
                    match part {
                        IncomingPart::Text { text } | IncomingPart::Plain(text) => {
                            collected.push(ChatPart { text });
                        }
                        IncomingPart::Other(_) => {
                            malformed = true;
                            break;
                        }
                    }
                }
                if malformed {
                    dropped += 1;
                    continue;
                }
                collected
            }
        };

        turns.push(ChatTurn { role, parts });
    }

    (turns, dropped)
}

#[cfg(test)]
mod tests {
    use super::normalize_history;
    use crate::models::chat::{ChatPart, IncomingHistoryEntry};

    fn entries(raw: serde_json::Value) -> Vec<IncomingHistoryEntry> {
        serde_json::from_value(raw).expect("history should deserialize")
    }

    #[test]
    fn string_shorthand_becomes_a_single_part() {
        let history = entries(serde_json::json!([
            { "role": "user", "parts": "hello" },
        ]));

        let (turns, dropped) = normalize_history(history);
        assert_eq!(dropped, 0);
        assert_eq!(turns.len(), 1);
        assert_eq!(
            turns[0].parts,
            vec![ChatPart {
                text: "hello".to_string()
            }]
        );
    }

    #[test]
    fn object_and_bare_string_parts_are_both_kept() {
        let history = entries(serde_json::json!([
            { "role": "model", "parts": [{ "text": "first" }, "second"] },
        ]));

        let (turns, dropped) = normalize_history(history);
        assert_eq!(dropped, 0);
        assert_eq!(turns[0].role, "model");
        assert_eq!(turns[0].parts.len(), 2);
        assert_eq!(turns[0].parts[1].text, "second");
    }

    #[test]
    fn entries_with_unknown_part_shapes_are_dropped_whole() {
        let history = entries(serde_json::json!([
            { "role": "user", "parts": [{ "text": "kept" }] },
            { "role": "user", "parts": [{ "text": "lost" }, { "inlineData": { "mimeType": "image/png" } }] },
        ]));

        let (turns, dropped) = normalize_history(history);
        assert_eq!(dropped, 1);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].parts[0].text, "kept");
    }

    #[test]
    fn missing_role_defaults_to_user() {
        let history = entries(serde_json::json!([
            { "parts": "no role here" },
        ]));

        let (turns, _) = normalize_history(history);
        assert_eq!(turns[0].role, "user");
    }
}
