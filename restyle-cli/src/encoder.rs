// ABOUTME: Reads a source image and encodes it for transport to the provider
// ABOUTME: Produces the base64 payload and the data URI the prediction input expects

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::path::Path;

use crate::constants::files;
use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub base64: String,
    pub mime_type: String,
}

impl EncodedImage {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

/// Guess a MIME type from the file extension, for callers that did not
/// declare one.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

pub fn encode_image_file(
    path: &Path,
    mime_type: Option<&str>,
) -> Result<EncodedImage, PipelineError> {
    let bytes = std::fs::read(path).map_err(|e| PipelineError::io(path, e))?;

    let mime_type = mime_type
        .map(str::trim)
        .filter(|mime| !mime.is_empty())
        .or_else(|| mime_from_extension(path))
        .unwrap_or(files::DEFAULT_MIME_TYPE)
        .to_string();

    log::debug!(
        "Encoded {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        mime_type
    );

    Ok(EncodedImage {
        base64: BASE64.encode(&bytes),
        mime_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_encode_with_declared_mime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.png");
        std::fs::write(&path, b"hello").unwrap();

        let encoded = encode_image_file(&path, Some("image/png")).unwrap();

        assert_eq!(encoded.base64, "aGVsbG8=");
        assert_eq!(encoded.data_uri(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_encode_defaults_mime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("upload");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();

        let encoded = encode_image_file(&path, None).unwrap();
        assert_eq!(encoded.mime_type, "image/jpeg");

        let encoded = encode_image_file(&path, Some("  ")).unwrap();
        assert_eq!(encoded.mime_type, "image/jpeg");
    }

    #[test]
    fn test_encode_infers_mime_from_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cat.png");
        std::fs::write(&path, b"png").unwrap();

        let encoded = encode_image_file(&path, None).unwrap();
        assert!(encoded.data_uri().starts_with("data:image/png;base64,"));

        // A declared type wins over the extension.
        let encoded = encode_image_file(&path, Some("image/webp")).unwrap();
        assert_eq!(encoded.mime_type, "image/webp");
    }

    #[test]
    fn test_encode_missing_file() {
        let result = encode_image_file(Path::new("/definitely/not/here.png"), None);
        assert!(matches!(result, Err(PipelineError::Io { .. })));
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension(Path::new("a.PNG")), Some("image/png"));
        assert_eq!(mime_from_extension(Path::new("a.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_from_extension(Path::new("a.txt")), None);
        assert_eq!(mime_from_extension(Path::new("noext")), None);
    }
}
