// ABOUTME: Centralized constants for the restyle CLI application
// ABOUTME: Contains output geometry, file naming, download limits and configuration defaults

/// Output image geometry
pub mod geometry {
    /// Every normalized output is exactly this wide
    pub const TARGET_WIDTH: u32 = 512;

    /// Tallest output box accepted; taller ratios are treated as malformed
    pub const MAX_TARGET_HEIGHT: u32 = 8192;

    /// Aspect ratio used when none (or a malformed one) is requested
    pub const DEFAULT_ASPECT_RATIO: &str = "1:1";
}

/// File naming and serving contract
pub mod files {
    /// Extension of both the raw download and the normalized output
    pub const OUTPUT_EXTENSION: &str = "png";

    /// Suffix distinguishing the normalized output from the raw download
    pub const RESIZED_SUFFIX: &str = "-resized";

    /// URL path prefix under which the output directory is served
    pub const OUTPUTS_URL_PREFIX: &str = "/outputs";

    /// MIME type assumed when the caller supplies none
    pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";
}

/// Result download limits
pub mod download {
    use std::time::Duration;

    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Redirects followed when fetching a result
    pub const MAX_REDIRECTS: usize = 3;

    /// Largest result body accepted (50MB)
    pub const MAX_RESULT_BYTES: u64 = 50 * 1024 * 1024;

    /// Progress bar tick interval for smooth animation
    pub const PROGRESS_BAR_TICK_MS: u64 = 80;
}

/// Configuration defaults and environment variable names
pub mod config {
    pub const DEFAULT_PORT: u16 = 5001;
    pub const DEFAULT_OUTPUT_DIR: &str = "outputs";
    pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

    pub const PROJECT_CONFIG_FILE: &str = "restyle.toml";
    pub const APP_DIR: &str = "restyle";

    pub const ENV_API_TOKEN: &str = "REPLICATE_API_TOKEN";
    pub const ENV_API_BASE: &str = "REPLICATE_API_BASE";
    pub const ENV_MODEL_VERSION: &str = "REPLICATE_MODEL_VERSION";
    pub const ENV_PORT: &str = "PORT";
    pub const ENV_OUTPUT_DIR: &str = "RESTYLE_OUTPUT_DIR";
    pub const ENV_UPLOAD_DIR: &str = "RESTYLE_UPLOAD_DIR";
    pub const ENV_PUBLIC_URL: &str = "RESTYLE_PUBLIC_URL";
}

/// Outward failure messages; internal detail never reaches the caller
pub mod messages {
    pub const BAD_REQUEST: &str = "Prompt and image are required.";
    pub const GENERATION_FAILED: &str = "Image generation failed or timed out.";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_constants() {
        assert_eq!(geometry::TARGET_WIDTH, 512);
        assert_eq!(geometry::DEFAULT_ASPECT_RATIO, "1:1");
    }

    #[test]
    fn test_file_constants() {
        assert_eq!(files::OUTPUTS_URL_PREFIX, "/outputs");
        assert!(files::DEFAULT_MIME_TYPE.starts_with("image/"));
    }

    #[test]
    fn test_config_constants() {
        assert_eq!(config::DEFAULT_PORT, 5001);
        assert!(config::PROJECT_CONFIG_FILE.ends_with(".toml"));
    }
}
