//! Generation client abstraction.

use async_trait::async_trait;
use thiserror::Error;

use super::config::ConfigError;
use super::types::{GenerateRequest, GenerateResponse, OnUpdate};

/// HTTP statuses that mean "try the next model".
pub const TRANSIENT_STATUSES: &[u16] = &[500, 503];

/// Message fragments that mark a transport failure as temporary unavailability.
pub const TRANSIENT_MARKERS: &[&str] = &[
    "500",
    "503",
    "unavailable",
    "service unavailable",
    "overloaded",
];

#[derive(Error, Debug)]
pub enum AiError {
    #[error("API returned error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Response not in cache and offline mode is enabled")]
    OfflineNotCached,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AiError {
    /// Whether the failure is temporary service unavailability worth retrying on
    /// another model. Everything else (auth, quota, bad request) is fatal.
    pub fn is_transient(&self) -> bool {
        match self {
            AiError::Api { status, .. } => TRANSIENT_STATUSES.contains(status),
            AiError::RequestFailed(message) => {
                let lower = message.to_lowercase();
                TRANSIENT_MARKERS.iter().any(|marker| lower.contains(marker))
            }
            AiError::ParseError(_) | AiError::OfflineNotCached | AiError::Config(_) => false,
        }
    }
}

/// A backend able to run one structured generation against a named model.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Run the request and return the fully assembled text.
    async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, AiError>;

    /// Run the request, reporting the cumulative text after each chunk.
    ///
    /// Clients without incremental output deliver the final text as a single update.
    async fn generate_stream(
        &self,
        model: &str,
        request: &GenerateRequest,
        on_update: OnUpdate<'_>,
    ) -> Result<GenerateResponse, AiError> {
        let response = self.generate(model, request).await?;
        on_update(&response.content);
        Ok(response)
    }

    /// Provider name, e.g. "gemini" or "fake".
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        for status in [500, 503] {
            let err = AiError::Api {
                status,
                message: "boom".to_string(),
            };
            assert!(err.is_transient(), "{status} should be transient");
        }
    }

    #[test]
    fn client_errors_are_fatal() {
        for status in [400, 401, 403, 404, 429, 502] {
            let err = AiError::Api {
                status,
                message: "The model is overloaded".to_string(),
            };
            assert!(!err.is_transient(), "{status} should be fatal");
        }
    }

    #[test]
    fn transport_messages_are_classified_by_vocabulary() {
        assert!(AiError::RequestFailed("got 503 from upstream".to_string()).is_transient());
        assert!(AiError::RequestFailed("Service Unavailable".to_string()).is_transient());
        assert!(AiError::RequestFailed("status: UNAVAILABLE".to_string()).is_transient());
        assert!(!AiError::RequestFailed("connection refused".to_string()).is_transient());
        assert!(!AiError::ParseError("503".to_string()).is_transient());
        assert!(!AiError::OfflineNotCached.is_transient());
    }
}
