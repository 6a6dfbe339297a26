// ABOUTME: Custom error types for the restyle SDK
// ABOUTME: Separates transport failures from provider rejections so polling can tell them apart

use crate::constants::errors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Provider rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Timeout: Request took too long to complete")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// Build a rejection, truncating the body to something fit for a log line.
    pub fn rejected(status: u16, body: &str) -> Self {
        ProviderError::Rejected {
            status,
            body: truncate_text(body, errors::MAX_BODY_PREVIEW),
        }
    }

    pub fn help_text(&self) -> Option<&'static str> {
        match self {
            ProviderError::Rejected { status: 401, .. } => {
                Some("Check that REPLICATE_API_TOKEN is set to a valid token")
            }
            ProviderError::Unavailable(_) => Some("Check your internet connection and try again"),
            ProviderError::Timeout => Some("Try again or check your network connection"),
            ProviderError::Configuration(_) => {
                Some("Check the provider settings in restyle.toml or the environment")
            }
            _ => None,
        }
    }

    /// Whether a poll tick that hit this error should simply count as a
    /// non-terminal tick.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Unavailable(_) | ProviderError::Timeout => true,
            ProviderError::Rejected { status, .. } => {
                *status == errors::TOO_MANY_REQUESTS
                    || (errors::SERVER_ERROR_MIN..=errors::SERVER_ERROR_MAX).contains(status)
            }
            ProviderError::InvalidResponse(_) => true,
            ProviderError::Configuration(_) => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderError::rejected(status.as_u16(), &err.to_string())
        } else {
            ProviderError::Unavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::InvalidResponse(err.to_string())
    }
}

pub(crate) fn truncate_text(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}
