// ABOUTME: Orchestrates encode -> submit -> poll -> fetch -> normalize for one request
// ABOUTME: Collapses every stage failure into the outward payload and logs the internal detail

use serde::Serialize;
use std::path::PathBuf;

use restyle_sdk::{JobPoller, JobSubmitter, PredictionApi};

use crate::config::Settings;
use crate::encoder::encode_image_file;
use crate::error::{FailureKind, PipelineError};
use crate::fetcher::ResultFetcher;
use crate::normalizer::{ImageNormalizer, NormalizedOutput};

/// One validated call into the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt_text: String,
    pub source_image_path: PathBuf,
    pub mime_type: Option<String>,
    pub aspect_ratio: Option<String>,
}

impl GenerationRequest {
    pub fn new(
        prompt_text: impl Into<String>,
        source_image_path: impl Into<PathBuf>,
    ) -> Result<Self, PipelineError> {
        Self::from_parts(
            Some(prompt_text.into()),
            Some(source_image_path.into()),
            None,
            None,
        )
    }

    /// Build a request from possibly-missing inbound fields.
    pub fn from_parts(
        prompt_text: Option<String>,
        source_image_path: Option<PathBuf>,
        mime_type: Option<String>,
        aspect_ratio: Option<String>,
    ) -> Result<Self, PipelineError> {
        let prompt_text = prompt_text
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .ok_or_else(|| PipelineError::Validation("prompt is required".to_string()))?;

        let source_image_path = source_image_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| PipelineError::Validation("image is required".to_string()))?;

        Ok(Self {
            prompt_text,
            source_image_path,
            mime_type,
            aspect_ratio,
        })
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(aspect_ratio.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub job_id: String,
    pub output: NormalizedOutput,
    pub url: String,
}

/// What the caller sees: `{ "url": ... }` or `{ "error": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GenerationResponse {
    Success { url: String },
    Failure { error: String },
}

impl GenerationResponse {
    pub fn failure(kind: FailureKind) -> Self {
        GenerationResponse::Failure {
            error: kind.message().to_string(),
        }
    }

    pub fn from_result(result: Result<GenerationResult, PipelineError>) -> Self {
        match result {
            Ok(result) => GenerationResponse::Success { url: result.url },
            Err(err) => {
                log::error!("Image generation failed at {} stage: {}", err.stage(), err);
                Self::failure(err.outward_kind())
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResponse::Success { .. })
    }

    pub fn status_code(&self) -> u16 {
        match self {
            GenerationResponse::Success { .. } => 200,
            GenerationResponse::Failure { error } if error == FailureKind::BadRequest.message() => {
                FailureKind::BadRequest.status_code()
            }
            GenerationResponse::Failure { .. } => FailureKind::GenerationFailed.status_code(),
        }
    }
}

/// Provider ids become file names, so they must not carry path syntax.
fn is_safe_job_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub struct Pipeline<A> {
    api: A,
    submitter: JobSubmitter,
    poller: JobPoller,
    fetcher: ResultFetcher,
    normalizer: ImageNormalizer,
    settings: Settings,
}

impl<A: PredictionApi> Pipeline<A> {
    pub fn new(api: A, fetcher: ResultFetcher, settings: Settings) -> Self {
        Self {
            api,
            submitter: JobSubmitter::default(),
            poller: JobPoller::default(),
            fetcher,
            normalizer: ImageNormalizer::default(),
            settings,
        }
    }

    pub fn with_submitter(mut self, submitter: JobSubmitter) -> Self {
        self.submitter = submitter;
        self
    }

    pub fn with_poller(mut self, poller: JobPoller) -> Self {
        self.poller = poller;
        self
    }

    pub fn with_normalizer(mut self, normalizer: ImageNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Validate-then-run entry point used by inbound adapters. A request that
    /// failed validation never reaches the provider.
    pub async fn handle(
        &self,
        request: Result<GenerationRequest, PipelineError>,
    ) -> GenerationResponse {
        let result = match request {
            Ok(request) => self.run(&request).await,
            Err(err) => Err(err),
        };
        GenerationResponse::from_result(result)
    }

    pub async fn run(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, PipelineError> {
        let encoded =
            encode_image_file(&request.source_image_path, request.mime_type.as_deref())?;

        let job = self
            .submitter
            .submit(&self.api, &encoded.data_uri(), &request.prompt_text)
            .await?;
        if !is_safe_job_id(&job.id) {
            return Err(PipelineError::ProviderRejected(format!(
                "provider returned unusable job id {:?}",
                job.id
            )));
        }

        let report = self.poller.poll(&self.api, job).await;
        let job_id = report.job.id.clone();
        let reference = match report.result_reference() {
            Some(reference) => reference.to_string(),
            None if report.timed_out() => {
                return Err(PipelineError::GenerationFailed {
                    job_id,
                    reason: format!(
                        "no terminal status after {} polls",
                        report.retry.attempts_made()
                    ),
                });
            }
            None => {
                return Err(PipelineError::GenerationFailed {
                    job_id,
                    reason: format!("job ended as {:?}", report.job.status()),
                });
            }
        };

        let raw_path = self
            .fetcher
            .fetch(&reference, &job_id, &self.settings.output_dir)
            .await?;

        let destination = ImageNormalizer::resized_path(&self.settings.output_dir, &job_id);
        let normalizer = self.normalizer.clone();
        let aspect_ratio = request.aspect_ratio.clone();
        let task_destination = destination.clone();
        let output = tokio::task::spawn_blocking(move || {
            normalizer.normalize(&raw_path, &task_destination, aspect_ratio.as_deref())
        })
        .await
        .map_err(|e| PipelineError::io(&destination, std::io::Error::other(e)))??;

        let file_name = output.file_name().unwrap_or_default().to_string();
        let url = self.settings.output_url(&file_name);
        log::info!(
            "Job {} normalized to {}x{} at {}",
            job_id,
            output.width,
            output.height,
            output.file_path.display()
        );

        Ok(GenerationResult {
            job_id,
            output,
            url,
        })
    }
}
