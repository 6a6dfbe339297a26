// ABOUTME: Job submission combining the caller's prompt and image with fixed generation parameters
// ABOUTME: A single attempt per request; failures are returned to the caller, not retried

use crate::types::{GenerationParams, Job, PredictionRequest};
use crate::{PredictionApi, Result};

#[derive(Debug, Clone, Default)]
pub struct JobSubmitter {
    params: GenerationParams,
}

impl JobSubmitter {
    pub fn new(params: GenerationParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn request_for(&self, image_data_uri: &str, prompt: &str) -> PredictionRequest {
        PredictionRequest::new(&self.params, image_data_uri.to_string(), prompt.to_string())
    }

    pub async fn submit<A>(&self, api: &A, image_data_uri: &str, prompt: &str) -> Result<Job>
    where
        A: PredictionApi + ?Sized,
    {
        let request = self.request_for(image_data_uri, prompt);
        let job = api.create_prediction(&request).await?;
        log::info!("Submitted prediction {} ({:?})", job.id, job.status());
        Ok(job)
    }
}
