use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;

/// Decodes submitted base64 images and persists them under a
/// directory-per-report layout rooted at the configured images dir.
#[derive(Clone, Debug)]
pub struct ImageStore {
    images_dir: PathBuf,
    max_size_bytes: usize,
}

impl ImageStore {
    pub fn new(config: &Config) -> Self {
        Self {
            images_dir: config.images_dir.clone(),
            max_size_bytes: config.max_image_size_bytes,
        }
    }

    /// Validate a base64 string and return the decoded bytes.
    /// No side effects on failure.
    pub fn decode_base64(&self, data: &str) -> Result<Vec<u8>, AppError> {
        // Strip an optional data-URI prefix (e.g. "data:image/jpeg;base64,...")
        let head = &data.as_bytes()[..data.len().min(80)];
        let payload = match head.iter().position(|&b| b == b',') {
            Some(idx) => &data[idx + 1..],
            None => data,
        };

        let decoded = BASE64
            .decode(payload)
            .map_err(|_| AppError::PayloadInvalid("Invalid base64 image data".to_string()))?;

        if decoded.len() > self.max_size_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Image exceeds maximum allowed size of {}KB",
                self.max_size_bytes / 1024
            )));
        }
        Ok(decoded)
    }

    /// Decode base64, write the bytes under the report's directory and
    /// return the generated filename (not the full path).
    pub fn save_image(&self, report_id: Uuid, image_b64: &str) -> Result<String, AppError> {
        let decoded = self.decode_base64(image_b64)?;

        let ext = detect_extension(&decoded);
        let filename = format!("{}{}", Uuid::new_v4().simple(), ext);
        let dir = self.report_dir(report_id)?;
        std::fs::write(dir.join(&filename), &decoded)?;
        Ok(filename)
    }

    /// Return (and create if absent) the image directory for a report.
    pub fn report_dir(&self, report_id: Uuid) -> Result<PathBuf, AppError> {
        let dir = self.images_dir.join(report_id.to_string());
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Path to a stored image, without touching the filesystem.
    pub fn image_path(&self, report_id: Uuid, filename: &str) -> PathBuf {
        self.images_dir.join(report_id.to_string()).join(filename)
    }

    /// Best-effort recursive removal of a report's image directory.
    pub fn remove_report_dir(&self, report_id: Uuid) {
        let dir = self.images_dir.join(report_id.to_string());
        if let Err(e) = std::fs::remove_dir_all(&dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(report_id = %report_id, error = %e, "failed to remove image dir");
            }
        }
    }
}

/// Best-effort image format detection via magic bytes.
fn detect_extension(data: &[u8]) -> &'static str {
    if data.len() >= 8 && data[..8] == [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A] {
        return ".png";
    }
    if data.len() >= 2 && data[..2] == [0xFF, 0xD8] {
        return ".jpg";
    }
    if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return ".webp";
    }
    if data.len() >= 3 && &data[..3] == b"GIF" {
        return ".gif";
    }
    ".bin"
}
