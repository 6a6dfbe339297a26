// ABOUTME: Library exports for restyle CLI modules for testing and external use
// ABOUTME: Makes the pipeline stages available to integration tests and the binary

pub mod config;
pub mod constants;
pub mod encoder;
pub mod error;
pub mod fetcher;
pub mod normalizer;
pub mod output;
pub mod pipeline;
pub mod uploads;

pub use error::{FailureKind, PipelineError};
pub use pipeline::{GenerationRequest, GenerationResponse, GenerationResult, Pipeline};
