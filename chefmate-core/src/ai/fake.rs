//! Fake AI client for testing.
//!
//! Replies are scripted per model id, allowing tests (and offline demos) to run
//! without network access or API costs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::client::{AiClient, AiError};
use super::types::{GenerateRequest, GenerateResponse, OnUpdate, Usage};

/// A complete sample response for "Lasagne", with a few fields left for the
/// normalizer to fill in.
pub const SAMPLE_RECIPE_JSON: &str = r#"{
  "originalName": "Lasagne",
  "versions": {
    "student": {
      "title": "Schnelle Pfannen-Lasagne",
      "prepTime": "25 min",
      "ingredients": [
        {"item": "Lasagneplatten", "amount": 200, "unit": "g", "category": "Vorrat"},
        {"item": "Hackfleisch", "amount": 300, "unit": "g", "category": "Fleisch"},
        {"item": "Passierte Tomaten", "amount": 500, "unit": "ml"}
      ],
      "steps": ["Hack anbraten.", "Tomaten zugeben.", "Platten einlegen und garen."],
      "tips": "Mit Reibekäse vom Discounter überbacken.",
      "calories": 650
    },
    "profi": {
      "title": "Lasagne al Forno mit Ragù Bolognese",
      "prepTime": "3 h",
      "ingredients": [
        {"item": "Frische Pastablätter", "amount": 250, "unit": "g", "category": "Vorrat"},
        {"item": "Rinderhack", "amount": 400, "unit": "g", "category": "Fleisch"},
        {"item": "Parmigiano Reggiano", "amount": 80, "unit": "g", "category": "Milchprodukte"}
      ],
      "steps": ["Ragù 2 Stunden schmoren.", "Béchamel ansetzen.", "Schichten und backen."],
      "tips": "Über Nacht ruhen lassen.",
      "calories": 820
    },
    "airfryer": {
      "title": "Mini-Lasagne aus dem Airfryer",
      "ingredients": [
        {"item": "Lasagneplatten", "amount": 150, "unit": "g", "category": "Vorrat"},
        {"item": "Mozzarella", "amount": 125, "unit": "g", "category": "Milchprodukte"}
      ],
      "steps": ["In Förmchen schichten.", "Bei 180 °C 15 Minuten garen."]
    }
  }
}"#;

/// What a fake model does when called.
#[derive(Debug, Clone)]
pub enum FakeReply {
    /// Succeed, streaming the text in these chunks.
    Chunks(Vec<String>),
    /// Fail with an HTTP-style API error.
    Error { status: u16, message: String },
    /// Fail at the transport level.
    TransportError(String),
    /// Stream these chunks, then fail with an API error.
    Interrupted {
        chunks: Vec<String>,
        status: u16,
        message: String,
    },
}

impl FakeReply {
    pub fn text(text: &str) -> Self {
        FakeReply::Chunks(vec![text.to_string()])
    }
}

/// A fake AI client for testing.
#[derive(Debug)]
pub struct FakeAiClient {
    /// Map of model id -> reply
    replies: RwLock<HashMap<String, FakeReply>>,
    /// Reply for models without a registered one
    default_reply: Option<FakeReply>,
    /// Model ids in call order
    calls: RwLock<Vec<String>>,
}

impl Default for FakeAiClient {
    fn default() -> Self {
        Self::new().with_default_reply(FakeReply::text(SAMPLE_RECIPE_JSON))
    }
}

impl FakeAiClient {
    /// Create a FakeAiClient with no registered replies.
    pub fn new() -> Self {
        Self {
            replies: RwLock::new(HashMap::new()),
            default_reply: None,
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Create a FakeAiClient where `model` answers with `text`.
    pub fn with_response(model: &str, text: &str) -> Self {
        let client = Self::new();
        client.add_reply(model, FakeReply::text(text));
        client
    }

    /// Register (or replace) the reply for a model.
    pub fn add_reply(&self, model: &str, reply: FakeReply) {
        if let Ok(mut replies) = self.replies.write() {
            replies.insert(model.to_string(), reply);
        }
    }

    pub fn add_response(&self, model: &str, text: &str) {
        self.add_reply(model, FakeReply::text(text));
    }

    pub fn add_error(&self, model: &str, status: u16, message: &str) {
        self.add_reply(
            model,
            FakeReply::Error {
                status,
                message: message.to_string(),
            },
        );
    }

    /// Set the reply used when no model-specific reply matches.
    pub fn with_default_reply(mut self, reply: FakeReply) -> Self {
        self.default_reply = Some(reply);
        self
    }

    /// Model ids this client was called with, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .read()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Chunks to deliver, and the error that follows them (if any).
    fn reply_for(&self, model: &str) -> Result<(Vec<String>, Option<AiError>), AiError> {
        if let Ok(mut calls) = self.calls.write() {
            calls.push(model.to_string());
        }

        let reply = self
            .replies
            .read()
            .ok()
            .and_then(|replies| replies.get(model).cloned())
            .or_else(|| self.default_reply.clone());

        match reply {
            Some(FakeReply::Chunks(chunks)) => Ok((chunks, None)),
            Some(FakeReply::Error { status, message }) => Err(AiError::Api { status, message }),
            Some(FakeReply::Interrupted {
                chunks,
                status,
                message,
            }) => Ok((chunks, Some(AiError::Api { status, message }))),
            Some(FakeReply::TransportError(message)) => Err(AiError::RequestFailed(message)),
            None => Err(AiError::RequestFailed(format!(
                "FakeAiClient: No reply configured for model {}",
                model
            ))),
        }
    }
}

fn response(model: &str, content: String) -> GenerateResponse {
    GenerateResponse {
        content,
        usage: Usage::default(),
        model: model.to_string(),
        cached: false,
    }
}

#[async_trait]
impl AiClient for FakeAiClient {
    async fn generate(
        &self,
        model: &str,
        _request: &GenerateRequest,
    ) -> Result<GenerateResponse, AiError> {
        let (chunks, error) = self.reply_for(model)?;
        match error {
            Some(e) => Err(e),
            None => Ok(response(model, chunks.concat())),
        }
    }

    async fn generate_stream(
        &self,
        model: &str,
        _request: &GenerateRequest,
        on_update: OnUpdate<'_>,
    ) -> Result<GenerateResponse, AiError> {
        let (chunks, error) = self.reply_for(model)?;

        let mut accumulated = String::new();
        for chunk in chunks {
            accumulated.push_str(&chunk);
            on_update(&accumulated);
        }

        match error {
            Some(e) => Err(e),
            None => Ok(response(model, accumulated)),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
