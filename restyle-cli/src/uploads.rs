// ABOUTME: Stages caller-supplied source images into the upload directory
// ABOUTME: Files are renamed to a millisecond timestamp keeping the original extension

use chrono::Utc;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// Upper bound on name collisions tolerated within the same millisecond.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Copy `source` into `upload_dir` as `<millis><.ext>` and return the new path.
pub fn stage_upload(source: &Path, upload_dir: &Path) -> Result<PathBuf, PipelineError> {
    std::fs::create_dir_all(upload_dir).map_err(|e| PipelineError::io(upload_dir, e))?;

    let extension = source
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();
    let mut reader = std::fs::File::open(source).map_err(|e| PipelineError::io(source, e))?;
    let stamp = Utc::now().timestamp_millis();

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = if attempt == 0 {
            format!("{}{}", stamp, extension)
        } else {
            format!("{}-{}{}", stamp, attempt, extension)
        };
        let target = upload_dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&target) {
            Ok(mut file) => {
                std::io::copy(&mut reader, &mut file).map_err(|e| PipelineError::io(&target, e))?;
                log::debug!("Staged {} as {}", source.display(), target.display());
                return Ok(target);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(PipelineError::io(&target, e)),
        }
    }

    Err(PipelineError::io(
        upload_dir,
        std::io::Error::new(ErrorKind::AlreadyExists, "no free upload name"),
    ))
}
