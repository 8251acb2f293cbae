//! Failure taxonomy for one analysis attempt.
//!
//! `Display` is the text shown on the result card.

use thiserror::Error;

use crate::config::strings;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("{}", strings::result::NO_API_KEY)]
    MissingCredential,

    #[error("{prefix}: {0}", prefix = strings::errors::IMAGE_COMPRESSION)]
    Decode(String),

    #[error("{prefix}: {0}", prefix = strings::errors::IMAGE_COMPRESSION)]
    Encode(String),

    #[error("{}", strings::errors::INVALID_API_KEY)]
    Auth,

    /// Non-success HTTP status, or an error object inside a 2xx body
    #[error(
        "{prefix}: {detail}",
        prefix = strings::errors::API_ERROR,
        detail = provider_detail(*status, message)
    )]
    Provider {
        status: Option<u16>,
        message: String,
    },

    #[error("{prefix}: No analysis result returned", prefix = strings::errors::API_ERROR)]
    EmptyResponse,

    #[error("{prefix}: {0}", prefix = strings::errors::API_ERROR)]
    Unknown(String),
}

fn provider_detail(status: Option<u16>, message: &str) -> String {
    match (status, message.trim()) {
        (_, msg) if !msg.is_empty() => msg.to_string(),
        (Some(code), _) => format!("API error: {}", code),
        (None, _) => "API error".to_string(),
    }
}

impl AnalysisError {
    pub fn provider_status(status: u16) -> Self {
        Self::Provider {
            status: Some(status),
            message: String::new(),
        }
    }

    pub fn provider_message(message: impl Into<String>) -> Self {
        Self::Provider {
            status: None,
            message: message.into(),
        }
    }

    pub fn network() -> Self {
        Self::Unknown(strings::errors::NETWORK_ERROR.to_string())
    }

    /// Errors whose own text is shown instead of the generic wrapper
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::Auth)
    }

    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
