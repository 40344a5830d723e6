use thiserror::Error;

use crate::ai::{AiError, ConfigError};
use crate::normalize::NormalizeError;

/// Failure of a single `generate` call.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Every model in the chain failed transiently; carries the last failure.
    #[error("All models unavailable (last tried {model}): {source}")]
    Unavailable {
        model: String,
        #[source]
        source: AiError,
    },

    /// A model failed in a way another model would not fix.
    #[error("Generation with {model} failed: {source}")]
    Provider {
        model: String,
        #[source]
        source: AiError,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl GenerateError {
    /// HTTP status a server should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            GenerateError::InvalidInput(_) => 400,
            GenerateError::Config(_) => 500,
            GenerateError::Provider { .. } | GenerateError::MalformedResponse(_) => 502,
            GenerateError::Unavailable { .. } => 503,
        }
    }
}

impl From<ConfigError> for GenerateError {
    fn from(err: ConfigError) -> Self {
        GenerateError::Config(err.to_string())
    }
}

impl From<NormalizeError> for GenerateError {
    fn from(err: NormalizeError) -> Self {
        GenerateError::MalformedResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VariantKind;

    #[test]
    fn status_codes() {
        let transient = || AiError::Api {
            status: 503,
            message: "overloaded".to_string(),
        };

        assert_eq!(GenerateError::InvalidInput("x".into()).status_code(), 400);
        assert_eq!(GenerateError::Config("x".into()).status_code(), 500);
        assert_eq!(
            GenerateError::Unavailable {
                model: "m".into(),
                source: transient()
            }
            .status_code(),
            503
        );
        assert_eq!(
            GenerateError::Provider {
                model: "m".into(),
                source: transient()
            }
            .status_code(),
            502
        );
    }

    #[test]
    fn normalize_errors_are_malformed_responses() {
        let err: GenerateError = NormalizeError::MissingVariant(VariantKind::Profi).into();
        assert!(matches!(err, GenerateError::MalformedResponse(ref m) if m.contains("profi")));
    }
}
