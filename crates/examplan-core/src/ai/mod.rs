//! Model service access.
//!
//! The wizard talks to the model through [`ModelClient`] so tests can swap in
//! a scripted fake. [`GeminiClient`] is the production implementation.

mod gemini;

pub use gemini::{GeminiClient, ModelConfig, API_KEY_ENV};

use std::path::Path;

use crate::error::{Result, ValidationError};

/// Upload limit the front end advertises.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// An exam schedule image ready to send inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageUpload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Read a PNG or JPEG from disk.
    ///
    /// # Errors
    ///
    /// Fails for other extensions, files above `max_bytes`, or IO errors.
    pub fn from_path(path: &Path, max_bytes: u64) -> Result<Self> {
        let mime_type = mime_type_for(path).ok_or_else(|| ValidationError::UnsupportedImage {
            path: path.to_path_buf(),
        })?;
        let size = std::fs::metadata(path)?.len();
        if size > max_bytes {
            return Err(ValidationError::ImageTooLarge {
                size,
                limit: max_bytes,
            }
            .into());
        }
        let bytes = std::fs::read(path)?;
        tracing::debug!(path = %path.display(), size, mime_type, "loaded schedule image");
        Ok(Self::new(bytes, mime_type))
    }
}

fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

/// A conversational model session.
///
/// Both calls are one network round trip with no retry; any failure is
/// returned to the caller as-is.
#[allow(async_fn_in_trait)]
pub trait ModelClient {
    /// Send the extraction prompt together with the image. Returns raw text,
    /// usually JSON, possibly fenced.
    async fn extract(&mut self, image: &ImageUpload) -> Result<String>;

    /// Send a text-only prompt. Returns raw text.
    async fn generate(&mut self, prompt: &str) -> Result<String>;

    /// Forget any conversation state.
    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::io::Write;

    #[test]
    fn from_path_infers_mime_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.JPG");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"\xff\xd8\xff")
            .unwrap();

        let upload = ImageUpload::from_path(&path, DEFAULT_MAX_UPLOAD_BYTES).unwrap();
        assert_eq!(upload.mime_type, "image/jpeg");
        assert_eq!(upload.bytes.len(), 3);
    }

    #[test]
    fn from_path_rejects_other_formats_and_oversize_files() {
        let dir = tempfile::tempdir().unwrap();
        let gif = dir.path().join("schedule.gif");
        std::fs::write(&gif, b"GIF89a").unwrap();
        assert!(matches!(
            ImageUpload::from_path(&gif, DEFAULT_MAX_UPLOAD_BYTES),
            Err(CoreError::Validation(ValidationError::UnsupportedImage { .. }))
        ));

        let png = dir.path().join("schedule.png");
        std::fs::write(&png, [0u8; 32]).unwrap();
        assert!(matches!(
            ImageUpload::from_path(&png, 16),
            Err(CoreError::Validation(ValidationError::ImageTooLarge { size: 32, limit: 16 }))
        ));
    }
}
