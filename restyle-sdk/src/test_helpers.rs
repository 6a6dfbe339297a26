// ABOUTME: Test helper utilities for mocking predictions API responses and server
// ABOUTME: Provides mockito-based helpers for unit testing provider interactions

#[cfg(test)]
use mockito::{Server, ServerGuard};
#[cfg(test)]
use serde_json::json;

#[cfg(test)]
pub async fn mock_provider_server() -> ServerGuard {
    Server::new_async().await
}

#[cfg(test)]
pub fn mock_created_response(id: &str, poll_url: &str) -> serde_json::Value {
    json!({
        "id": id,
        "model": "stability-ai/stable-diffusion-img2img",
        "version": crate::constants::generation::MODEL_VERSION,
        "status": "starting",
        "input": {
            "prompt": "a cat"
        },
        "output": null,
        "error": null,
        "urls": {
            "get": poll_url,
            "cancel": format!("{}/cancel", poll_url)
        },
        "created_at": "2024-01-15T10:30:00Z"
    })
}

#[cfg(test)]
pub fn mock_state_response(status: &str, output: Option<&str>) -> serde_json::Value {
    json!({
        "id": "job-1",
        "status": status,
        "output": output.map(|url| vec![url]),
        "error": null,
        "logs": ""
    })
}

#[cfg(test)]
pub fn mock_error_response() -> serde_json::Value {
    json!({
        "title": "Invalid version or not permitted",
        "detail": "Invalid version or not permitted. The specified version does not exist (or perhaps you don't have permission to use it?)",
        "status": 422
    })
}
