// ABOUTME: HTTP client for downloading a finished job's result into the output directory
// ABOUTME: Implements timeouts, streamed size limits and per-job file naming

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::path::{Path, PathBuf};
use url::Url;

use crate::constants::{download, files};
use crate::error::PipelineError;

pub struct ResultFetcher {
    client: Client,
    max_size_bytes: u64,
    show_progress: bool,
}

impl ResultFetcher {
    pub fn new() -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(download::REQUEST_TIMEOUT)
            .user_agent(concat!("restyle/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(download::MAX_REDIRECTS))
            .build()
            .map_err(|e| {
                PipelineError::Download(format!("Failed to create HTTP client: {}", e))
            })?;

        let show_progress = {
            use std::io::IsTerminal;
            std::io::stderr().is_terminal()
        };

        Ok(Self {
            client,
            max_size_bytes: download::MAX_RESULT_BYTES,
            show_progress,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn with_max_size(mut self, max_size_bytes: u64) -> Self {
        self.max_size_bytes = max_size_bytes;
        self
    }

    /// Path the raw result of `job_id` is written to.
    pub fn raw_path(output_dir: &Path, job_id: &str) -> PathBuf {
        output_dir.join(format!("{}.{}", job_id, files::OUTPUT_EXTENSION))
    }

    /// Download `url` and store it as `<output_dir>/<job_id>.png`.
    pub async fn fetch(
        &self,
        url: &str,
        job_id: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, PipelineError> {
        let bytes = self.download(url).await?;

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| PipelineError::io(output_dir, e))?;
        let path = Self::raw_path(output_dir, job_id);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| PipelineError::io(&path, e))?;

        log::info!(
            "Saved result of {} to {} ({})",
            job_id,
            path.display(),
            format_bytes(bytes.len())
        );
        Ok(path)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, PipelineError> {
        let parsed = Url::parse(url)
            .map_err(|e| PipelineError::Download(format!("Invalid result URL {}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PipelineError::Download(format!(
                "Unsupported result URL scheme: {}",
                parsed.scheme()
            )));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| {
                PipelineError::Download(format!("HTTP request failed for {}: {}", url, e))
            })?;

        if !response.status().is_success() {
            return Err(PipelineError::Download(format!(
                "HTTP request failed with status {}: {}",
                response.status(),
                url
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_size_bytes {
                return Err(PipelineError::Download(format!(
                    "Result too large: {} bytes (max: {} bytes): {}",
                    content_length, self.max_size_bytes, url
                )));
            }
        }

        self.download_body_with_limit(response, url).await
    }

    async fn download_body_with_limit(
        &self,
        response: reqwest::Response,
        url: &str,
    ) -> Result<Vec<u8>, PipelineError> {
        let progress_bar = self.progress_bar(response.content_length(), url);

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                PipelineError::Download(format!("Failed to read response body: {}", e))
            })?;

            bytes.extend_from_slice(&chunk);

            if let Some(ref pb) = progress_bar {
                pb.set_position(bytes.len() as u64);
            }

            if bytes.len() as u64 > self.max_size_bytes {
                if let Some(pb) = progress_bar {
                    pb.finish_with_message("Download failed: size limit exceeded");
                }
                return Err(PipelineError::Download(format!(
                    "Result exceeded size limit during download: {} bytes (max: {}): {}",
                    bytes.len(),
                    self.max_size_bytes,
                    url
                )));
            }
        }

        if let Some(pb) = progress_bar {
            pb.finish_with_message(format!("Downloaded {}", format_bytes(bytes.len())));
        }

        Ok(bytes)
    }

    fn progress_bar(&self, content_length: Option<u64>, url: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let filename = url.rsplit('/').next().unwrap_or("result");
        let pb = match content_length {
            Some(total) => {
                let pb = ProgressBar::new(total);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("{msg} [{bar:25.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})")
                {
                    pb.set_style(style.progress_chars("=>-"));
                }
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                if let Ok(style) =
                    ProgressStyle::default_spinner().template("{spinner:.green} {msg} {bytes}")
                {
                    pb.set_style(style);
                }
                pb.enable_steady_tick(std::time::Duration::from_millis(
                    download::PROGRESS_BAR_TICK_MS,
                ));
                pb
            }
        };
        pb.set_message(format!("Downloading {}", filename));
        Some(pb)
    }
}

/// Format bytes in a human-readable way
fn format_bytes(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
