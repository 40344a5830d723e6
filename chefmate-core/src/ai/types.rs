//! Provider-neutral request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One piece of user content.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    /// Binary content sent inline, tagged with its MIME type.
    InlineData { mime_type: String, data: Vec<u8> },
}

impl Part {
    pub fn text(content: impl Into<String>) -> Self {
        Part::Text(content.into())
    }

    pub fn inline_data(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Part::InlineData {
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text(text) => Some(text),
            Part::InlineData { .. } => None,
        }
    }
}

/// Request for a structured generation.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub system_instruction: Option<String>,
    /// Ordered user content.
    pub parts: Vec<Part>,
    /// If set, the model must return JSON conforming to this schema.
    pub response_schema: Option<JsonValue>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response from a generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated text, fully assembled.
    pub content: String,
    pub usage: Usage,
    /// Model that produced the content.
    pub model: String,
    /// Whether this response came from cache.
    #[serde(default)]
    pub cached: bool,
}

/// Callback receiving the cumulative text after each streamed chunk.
///
/// Invoked synchronously, in arrival order, on the task driving the request.
pub type OnUpdate<'a> = &'a (dyn Fn(&str) + Send + Sync);
