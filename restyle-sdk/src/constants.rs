// ABOUTME: Centralized constants for the restyle SDK
// ABOUTME: Contains polling budget, timeouts, provider URLs and generation defaults

/// Polling configuration constants
pub mod polling {
    use std::time::Duration;

    /// Maximum number of poll ticks before a job is given up on
    pub const MAX_ATTEMPTS: u32 = 20;

    /// Fixed delay before every poll tick
    pub const INTERVAL: Duration = Duration::from_millis(1500);
}

/// HTTP and request timeouts
pub mod timeouts {
    use std::time::Duration;

    /// Default timeout for HTTP requests
    pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
}

/// Provider API URLs
pub mod urls {
    /// Base URL for the predictions API
    pub const PROVIDER_API_BASE: &str = "https://api.replicate.com/v1";

    /// Path of the job-creation endpoint, relative to the API base
    pub const PREDICTIONS_PATH: &str = "/predictions";
}

/// Fixed generation parameters sent with every prediction
pub mod generation {
    /// Model version identifier
    pub const MODEL_VERSION: &str =
        "6eb633a82ab3e7a4417d0af2e84e24b4b419c76f86f6e837824d02ae6845dc81";

    pub const SEED: i64 = 33;

    pub const STRENGTH: f64 = 0.5;

    pub const NEGATIVE_PROMPT: &str = "(deformed iris, deformed pupils, semi-realistic, cgi, 3d, render, sketch, cartoon, drawing, anime:1.4), text, close up, cropped, out of frame, worst quality, low quality, jpeg artifacts, ugly, duplicate, morbid, mutilated, extra fingers, mutated hands, poorly drawn hands, poorly drawn face, mutation, deformed, blurry, dehydrated, bad anatomy, bad proportions, extra limbs, cloned face, disfigured, gross proportions, malformed limbs, missing arms, missing legs, extra arms, extra legs, fused fingers, too many fingers, long neck";
}

/// Error handling constants
pub mod errors {
    /// Server error status code range
    pub const SERVER_ERROR_MIN: u16 = 500;
    pub const SERVER_ERROR_MAX: u16 = 599;

    /// Rate limit status code
    pub const TOO_MANY_REQUESTS: u16 = 429;

    /// Maximum number of characters of a provider error body kept for logs
    pub const MAX_BODY_PREVIEW: usize = 512;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_polling_constants() {
        assert_eq!(polling::MAX_ATTEMPTS, 20);
        assert_eq!(polling::INTERVAL, Duration::from_millis(1500));
    }

    #[test]
    fn test_timeout_constants() {
        assert_eq!(timeouts::HTTP_REQUEST_TIMEOUT, Duration::from_secs(30));
    }

    #[test]
    fn test_url_constants() {
        assert!(urls::PROVIDER_API_BASE.starts_with("https://"));
        assert!(urls::PREDICTIONS_PATH.starts_with('/'));
    }

    #[test]
    fn test_generation_constants() {
        assert_eq!(generation::SEED, 33);
        assert_eq!(generation::STRENGTH, 0.5);
        assert_eq!(generation::MODEL_VERSION.len(), 64);
        assert!(generation::NEGATIVE_PROMPT.ends_with("long neck"));
    }

    #[test]
    fn test_error_constants() {
        assert_eq!(errors::SERVER_ERROR_MIN, 500);
        assert_eq!(errors::SERVER_ERROR_MAX, 599);
        assert_eq!(errors::TOO_MANY_REQUESTS, 429);
    }
}
