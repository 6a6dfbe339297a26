// ABOUTME: Pipeline error taxonomy and its collapse into the two outward failure kinds
// ABOUTME: Internal detail stays in logs; callers only learn "bad request" or "generation failed"

use crate::constants::messages;
use restyle_sdk::ProviderError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Provider rejected submission: {0}")]
    ProviderRejected(String),

    #[error("Generation failed for job {job_id}: {reason}")]
    GenerationFailed { job_id: String, reason: String },

    #[error("Download failed: {0}")]
    Download(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
}

/// What the caller is allowed to learn about a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    BadRequest,
    GenerationFailed,
}

impl FailureKind {
    pub fn message(self) -> &'static str {
        match self {
            FailureKind::BadRequest => messages::BAD_REQUEST,
            FailureKind::GenerationFailed => messages::GENERATION_FAILED,
        }
    }

    /// HTTP status the serving layer should answer with.
    pub fn status_code(self) -> u16 {
        match self {
            FailureKind::BadRequest => 400,
            FailureKind::GenerationFailed => 500,
        }
    }
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn outward_kind(&self) -> FailureKind {
        match self {
            PipelineError::Validation(_) => FailureKind::BadRequest,
            _ => FailureKind::GenerationFailed,
        }
    }

    /// Stage name used when logging the collapsed failure.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "validation",
            PipelineError::ProviderUnavailable(_) | PipelineError::ProviderRejected(_) => {
                "submission"
            }
            PipelineError::GenerationFailed { .. } => "polling",
            PipelineError::Download(_) => "download",
            PipelineError::Io { .. } => "filesystem",
            PipelineError::UnsupportedFormat(_) => "normalization",
        }
    }
}

/// Submission-stage mapping: transport trouble is "unavailable", everything
/// the provider answered with is a rejection.
impl From<ProviderError> for PipelineError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unavailable(_) | ProviderError::Timeout => {
                PipelineError::ProviderUnavailable(err.to_string())
            }
            other => PipelineError::ProviderRejected(other.to_string()),
        }
    }
}
