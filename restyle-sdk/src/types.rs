// ABOUTME: Wire types for the predictions API and the Job state machine built from them
// ABOUTME: Maps provider status strings onto JobStatus and enforces terminal-state stickiness

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::generation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    /// Map a provider status string. Unknown values are treated as still running.
    pub fn from_provider(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "starting" | "pending" | "queued" => JobStatus::Pending,
            "succeeded" => JobStatus::Succeeded,
            "failed" | "canceled" | "cancelled" => JobStatus::Failed,
            _ => JobStatus::Running,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(JobStatus::from_provider(&raw))
    }
}

/// Fixed generation parameters. Only the prompt and image come from the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub version: String,
    pub seed: i64,
    pub strength: f64,
    pub negative_prompt: String,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            version: generation::MODEL_VERSION.to_string(),
            seed: generation::SEED,
            strength: generation::STRENGTH,
            negative_prompt: generation::NEGATIVE_PROMPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionInput {
    pub image: String,
    pub seed: i64,
    pub prompt: String,
    pub strength: f64,
    pub negative_prompt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionRequest {
    pub version: String,
    pub input: PredictionInput,
}

impl PredictionRequest {
    pub fn new(params: &GenerationParams, image_data_uri: String, prompt: String) -> Self {
        Self {
            version: params.version.clone(),
            input: PredictionInput {
                image: image_data_uri,
                seed: params.seed,
                prompt,
                strength: params.strength,
                negative_prompt: params.negative_prompt.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionUrls {
    pub get: String,
}

/// Response to the job-creation call.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionCreated {
    pub id: String,
    pub status: JobStatus,
    pub urls: PredictionUrls,
    #[serde(default)]
    pub output: Option<Value>,
}

/// Response to a poll of an existing job.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionState {
    pub status: JobStatus,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// Pick the result reference out of a prediction's `output`, which may be a
/// single value or an ordered sequence. The first non-empty entry wins.
pub fn first_output(output: &Value) -> Option<String> {
    match output {
        Value::String(url) => {
            let trimmed = url.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Array(items) => items.first().and_then(first_output),
        _ => None,
    }
}

/// One provider-side generation task.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: String,
    pub poll_endpoint: String,
    status: JobStatus,
    result_reference: Option<String>,
}

impl Job {
    pub fn new(id: impl Into<String>, poll_endpoint: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            poll_endpoint: poll_endpoint.into(),
            status: JobStatus::Pending,
            result_reference: None,
        }
    }

    pub fn from_created(created: PredictionCreated) -> Self {
        let mut job = Job::new(created.id, created.urls.get);
        job.apply(created.status, created.output.as_ref());
        job
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn result_reference(&self) -> Option<&str> {
        self.result_reference.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply a provider-reported state. Returns `false` and leaves the job
    /// untouched once it is terminal. The reference always reflects the
    /// latest state, so a success without its own output is recorded as a
    /// failure.
    pub fn apply(&mut self, status: JobStatus, output: Option<&Value>) -> bool {
        if self.is_terminal() {
            return false;
        }

        self.result_reference = output.and_then(first_output);

        self.status = match status {
            JobStatus::Succeeded if self.result_reference.is_none() => JobStatus::Failed,
            other => other,
        };
        true
    }

    pub fn apply_state(&mut self, state: &PredictionState) -> bool {
        self.apply(state.status, state.output.as_ref())
    }

    pub fn mark_failed(&mut self) -> bool {
        self.apply(JobStatus::Failed, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_mapping() {
        assert_eq!(JobStatus::from_provider("starting"), JobStatus::Pending);
        assert_eq!(JobStatus::from_provider("processing"), JobStatus::Running);
        assert_eq!(JobStatus::from_provider("SUCCEEDED"), JobStatus::Succeeded);
        assert_eq!(JobStatus::from_provider("failed"), JobStatus::Failed);
        assert_eq!(JobStatus::from_provider("canceled"), JobStatus::Failed);
        assert_eq!(JobStatus::from_provider("warming-up"), JobStatus::Running);
    }

    #[test]
    fn test_first_output_variants() {
        assert_eq!(
            first_output(&json!("http://x/img.png")),
            Some("http://x/img.png".to_string())
        );
        assert_eq!(
            first_output(&json!(["http://x/a.png", "http://x/b.png"])),
            Some("http://x/a.png".to_string())
        );
        assert_eq!(first_output(&json!([])), None);
        assert_eq!(first_output(&json!("")), None);
        assert_eq!(first_output(&Value::Null), None);
        assert_eq!(first_output(&json!({"url": "http://x"})), None);
    }

    #[test]
    fn test_created_response_deserializes() {
        let created: PredictionCreated = serde_json::from_value(json!({
            "id": "abc123",
            "status": "starting",
            "urls": {"get": "https://api.example.com/v1/predictions/abc123"}
        }))
        .unwrap();

        let job = Job::from_created(created);
        assert_eq!(job.id, "abc123");
        assert_eq!(job.status(), JobStatus::Pending);
        assert_eq!(job.result_reference(), None);
    }

    #[test]
    fn test_success_records_reference() {
        let mut job = Job::new("id", "http://poll");
        assert!(job.apply(JobStatus::Succeeded, Some(&json!(["http://x/img.png"]))));
        assert_eq!(job.status(), JobStatus::Succeeded);
        assert_eq!(job.result_reference(), Some("http://x/img.png"));
    }

    #[test]
    fn test_success_without_output_is_failure() {
        let mut job = Job::new("id", "http://poll");
        job.apply(JobStatus::Succeeded, Some(&json!([])));
        assert_eq!(job.status(), JobStatus::Failed);

        let mut job = Job::new("id", "http://poll");
        job.apply(JobStatus::Succeeded, None);
        assert_eq!(job.status(), JobStatus::Failed);
    }

    #[test]
    fn test_success_ignores_reference_from_earlier_state() {
        let mut job = Job::new("id", "http://poll");
        job.apply(JobStatus::Running, Some(&json!(["http://x/partial.png"])));
        assert_eq!(job.result_reference(), Some("http://x/partial.png"));

        job.apply(JobStatus::Succeeded, None);

        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.result_reference(), None);
    }

    #[test]
    fn test_terminal_status_is_sticky() {
        let mut job = Job::new("id", "http://poll");
        job.apply(JobStatus::Failed, None);

        assert!(!job.apply(JobStatus::Succeeded, Some(&json!("http://x/img.png"))));
        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.result_reference(), None);

        let mut job = Job::new("id", "http://poll");
        job.apply(JobStatus::Succeeded, Some(&json!("http://x/img.png")));
        assert!(!job.mark_failed());
        assert!(!job.apply(JobStatus::Running, Some(&json!("http://x/other.png"))));
        assert_eq!(job.status(), JobStatus::Succeeded);
        assert_eq!(job.result_reference(), Some("http://x/img.png"));
    }

    #[test]
    fn test_request_serializes_to_provider_shape() {
        let request = PredictionRequest::new(
            &GenerationParams::default(),
            "data:image/png;base64,AAAA".to_string(),
            "a cat".to_string(),
        );
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["version"], generation::MODEL_VERSION);
        assert_eq!(value["input"]["image"], "data:image/png;base64,AAAA");
        assert_eq!(value["input"]["prompt"], "a cat");
        assert_eq!(value["input"]["seed"], 33);
        assert_eq!(value["input"]["strength"], 0.5);
        assert!(value["input"]["negative_prompt"].is_string());
    }
}
