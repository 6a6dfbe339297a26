// ABOUTME: Aspect-ratio-aware normalization of downloaded results
// ABOUTME: Fixes the output width, derives the height from "W:H" and cover-resizes into that box

use image::{ImageFormat, ImageReader, imageops::FilterType};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::{files, geometry};
use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
        }
    }
}

impl AspectRatio {
    /// Strict parse of "W:H" with positive integers.
    pub fn parse(raw: &str) -> Option<Self> {
        let (w, h) = raw.trim().split_once(':')?;
        let width: u32 = w.trim().parse().ok()?;
        let height: u32 = h.trim().parse().ok()?;
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    /// Lenient parse: anything missing, malformed or too tall for the output
    /// box becomes 1:1.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw {
            Some(raw) => Self::parse(raw)
                .filter(Self::fits_target)
                .unwrap_or_else(|| {
                    log::debug!(
                        "Malformed aspect ratio {:?}, using {}",
                        raw,
                        geometry::DEFAULT_ASPECT_RATIO
                    );
                    Self::default()
                }),
            None => Self::default(),
        }
    }

    fn exact_height(&self, width: u32) -> f64 {
        (width as f64 * self.height as f64 / self.width as f64).round()
    }

    fn fits_target(&self) -> bool {
        self.exact_height(geometry::TARGET_WIDTH) <= geometry::MAX_TARGET_HEIGHT as f64
    }

    /// Output box for this ratio: fixed width, height = round(width * H / W),
    /// clamped to `1..=MAX_TARGET_HEIGHT`.
    pub fn target_dimensions(&self, width: u32) -> (u32, u32) {
        let height = self
            .exact_height(width)
            .clamp(1.0, geometry::MAX_TARGET_HEIGHT as f64);
        (width, height as u32)
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOutput {
    pub file_path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl NormalizedOutput {
    pub fn file_name(&self) -> Option<&str> {
        self.file_path.file_name().and_then(|name| name.to_str())
    }
}

#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    target_width: u32,
    filter: FilterType,
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self {
            target_width: geometry::TARGET_WIDTH,
            filter: FilterType::Lanczos3,
        }
    }
}

impl ImageNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Path the normalized output of `job_id` is written to.
    pub fn resized_path(output_dir: &Path, job_id: &str) -> PathBuf {
        output_dir.join(format!(
            "{}{}.{}",
            job_id,
            files::RESIZED_SUFFIX,
            files::OUTPUT_EXTENSION
        ))
    }

    pub fn normalize(
        &self,
        source: &Path,
        destination: &Path,
        aspect_ratio: Option<&str>,
    ) -> Result<NormalizedOutput, PipelineError> {
        let ratio = AspectRatio::parse_or_default(aspect_ratio);
        let (width, height) = ratio.target_dimensions(self.target_width);

        let img = ImageReader::open(source)
            .map_err(|e| PipelineError::io(source, e))?
            .with_guessed_format()
            .map_err(|e| PipelineError::io(source, e))?
            .decode()
            .map_err(|e| match e {
                image::ImageError::IoError(io) => PipelineError::io(source, io),
                other => PipelineError::UnsupportedFormat(format!(
                    "{}: {}",
                    source.display(),
                    other
                )),
            })?;

        log::debug!(
            "Aspect ratio {}: resizing {}x{} to {}x{}",
            ratio,
            img.width(),
            img.height(),
            width,
            height
        );

        let resized = img.resize_to_fill(width, height, self.filter);

        resized
            .save_with_format(destination, ImageFormat::Png)
            .map_err(|e| match e {
                image::ImageError::IoError(io) => PipelineError::io(destination, io),
                other => PipelineError::UnsupportedFormat(format!(
                    "Failed to encode {}: {}",
                    destination.display(),
                    other
                )),
            })?;

        Ok(NormalizedOutput {
            file_path: destination.to_path_buf(),
            width: resized.width(),
            height: resized.height(),
        })
    }
}
