// ABOUTME: restyle SDK providing an async client for a Replicate-style predictions API
// ABOUTME: Includes the job state machine, submission, bounded polling and provider errors

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use url::Url;

pub mod builder;
pub mod constants;
pub mod error;
pub mod poller;
pub mod submitter;
pub mod types;

#[cfg(test)]
pub mod test_helpers;

pub use builder::ProviderClientConfig;
pub use error::ProviderError;
pub use poller::{JobPoller, PollConfig, PollReport, RetryState};
pub use submitter::JobSubmitter;
pub use types::{
    GenerationParams, Job, JobStatus, PredictionCreated, PredictionRequest, PredictionState,
};

pub type Result<T> = std::result::Result<T, ProviderError>;

/// The two provider calls the pipeline depends on. Implemented by
/// [`ProviderClient`] and by in-memory fakes in tests.
#[async_trait]
pub trait PredictionApi: Send + Sync {
    /// Create a prediction and return the job it describes.
    async fn create_prediction(&self, request: &PredictionRequest) -> Result<Job>;

    /// Fetch the current state of a prediction from its poll endpoint.
    async fn get_prediction(&self, poll_endpoint: &str) -> Result<PredictionState>;
}

#[derive(Clone)]
pub struct ProviderClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ProviderClient {
    pub fn from_config(config: ProviderClientConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(constants::urls::PROVIDER_API_BASE)
            .trim()
            .trim_end_matches('/');
        let base_url = Url::parse(base_url).map_err(|e| {
            ProviderError::Configuration(format!("Invalid provider base URL: {}", e))
        })?;

        let token = config.auth_token.expose_secret().trim();
        if token.is_empty() {
            return Err(ProviderError::Configuration(
                "Provider token is empty".to_string(),
            ));
        }

        let mut auth_value = HeaderValue::from_str(&format!("Token {}", token)).map_err(|_| {
            ProviderError::Configuration("Provider token contains invalid characters".to_string())
        })?;
        auth_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|_| {
                ProviderError::Configuration("User agent contains invalid characters".to_string())
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Configuration(format!("Failed to build client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn predictions_endpoint(&self) -> String {
        format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            constants::urls::PREDICTIONS_PATH
        )
    }

    async fn json_or_error<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::rejected(status.as_u16(), &body));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl PredictionApi for ProviderClient {
    #[tracing::instrument(skip(self, request), fields(version = %request.version))]
    async fn create_prediction(&self, request: &PredictionRequest) -> Result<Job> {
        let endpoint = self.predictions_endpoint();
        let response = self.client.post(&endpoint).json(request).send().await?;
        let created: PredictionCreated = Self::json_or_error(response).await?;

        Url::parse(&created.urls.get).map_err(|e| {
            ProviderError::InvalidResponse(format!(
                "Prediction {} has an invalid poll URL: {}",
                created.id, e
            ))
        })?;

        log::debug!(
            "Created prediction {} with status {:?}",
            created.id,
            created.status
        );
        Ok(Job::from_created(created))
    }

    #[tracing::instrument(skip(self))]
    async fn get_prediction(&self, poll_endpoint: &str) -> Result<PredictionState> {
        let response = self.client.get(poll_endpoint).send().await?;
        Self::json_or_error(response).await
    }
}
