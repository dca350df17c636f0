//! Chat request model
//!
//! Inbound payloads are decoded into a typed [`ChatRequest`] and reduced to a
//! [`Prompt`]. Rejections happen in a fixed order so the first failure is
//! always the same for a given body:
//!
//! 1. body is not JSON                      -> `InvalidJson`
//! 2. `messages` missing, empty, not a list -> `MissingMessages`
//! 3. last message role is not `"user"`     -> `WrongRole`
//! 4. last message content blank            -> `EmptyPrompt`

use serde_json::Value;
use std::fmt;

use crate::errors::GatewayError;

/// Role a message must carry to be used as the prompt
pub const USER_ROLE: &str = "user";

/// One chat message
///
/// Fields are kept as found on the wire; a missing or non-string value is
/// `None` so the validation step decides what it means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Option<String>,
    pub content: Option<String>,
}

impl Message {
    fn from_value(value: &Value) -> Self {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            role: field("role"),
            content: field("content"),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role.as_deref() == Some(USER_ROLE)
    }
}

/// Chat-completion request: a non-empty, ordered list of messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    messages: Vec<Message>,
}

impl ChatRequest {
    /// Decode a raw request body (steps 1 and 2)
    pub fn from_slice(body: &[u8]) -> Result<Self, GatewayError> {
        let payload: Value = serde_json::from_slice(body).map_err(|_| GatewayError::InvalidJson)?;
        Self::from_value(&payload)
    }

    /// Decode an already parsed JSON document (step 2)
    pub fn from_value(payload: &Value) -> Result<Self, GatewayError> {
        let messages = payload
            .get("messages")
            .and_then(Value::as_array)
            .filter(|messages| !messages.is_empty())
            .ok_or(GatewayError::MissingMessages)?;

        Ok(Self {
            messages: messages.iter().map(Message::from_value).collect(),
        })
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The message used as the prompt source
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Reduce to the prompt (steps 3 and 4)
    pub fn into_prompt(self) -> Result<Prompt, GatewayError> {
        let last = self.last_message().ok_or(GatewayError::MissingMessages)?;
        if !last.is_user() {
            return Err(GatewayError::WrongRole);
        }
        Prompt::new(last.content.as_deref().unwrap_or(""))
    }

    /// Decode and validate in one step
    pub fn parse_prompt(body: &[u8]) -> Result<Prompt, GatewayError> {
        Self::from_slice(body)?.into_prompt()
    }
}

/// Trimmed, non-empty prompt text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub fn new(text: &str) -> Result<Self, GatewayError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(GatewayError::EmptyPrompt);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Character count, used for request logging
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
