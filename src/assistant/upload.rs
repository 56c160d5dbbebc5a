use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use thiserror::Error;
use tracing::debug;

use crate::gemini_client::Part;

/// Largest inline payload Gemini accepts, measured after base64 encoding.
pub const MAX_INLINE_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("unsupported image type: {} (expected png, jpeg, webp, heic or heif)", .0.display())]
    UnsupportedType(PathBuf),

    #[error("{} is empty", .0.display())]
    Empty(PathBuf),

    #[error("{} is {size} bytes ({encoded} encoded); the limit is {}", .path.display(), MAX_INLINE_BYTES)]
    TooLarge { path: PathBuf, size: u64, encoded: u64 },
}

/// An image file ready to be sent as inline data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub async fn from_path(path: &Path) -> Result<Self, UploadError> {
        let mime_type =
            mime_for_path(path).ok_or_else(|| UploadError::UnsupportedType(path.to_path_buf()))?;

        let read_error = |source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        };

        let size = tokio::fs::metadata(path).await.map_err(read_error)?.len();
        if size == 0 {
            return Err(UploadError::Empty(path.to_path_buf()));
        }
        let encoded = encoded_len(size);
        if encoded > MAX_INLINE_BYTES {
            return Err(UploadError::TooLarge {
                path: path.to_path_buf(),
                size,
                encoded,
            });
        }

        let bytes = tokio::fs::read(path).await.map_err(read_error)?;

        debug!("Loaded {} ({} bytes, {})", path.display(), bytes.len(), mime_type);
        Ok(Self { mime_type, bytes })
    }

    pub fn to_part(&self) -> Part {
        Part::InlineData {
            mime_type: self.mime_type.to_string(),
            data: BASE64.encode(&self.bytes),
        }
    }
}

/// Length of `size` bytes once base64 encoded with padding.
fn encoded_len(size: u64) -> u64 {
    (size + 2) / 3 * 4
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn reads_and_encodes_a_jpeg() {
        let mut file = tempfile::Builder::new().suffix(".JPG").tempfile().unwrap();
        file.write_all(&[0xff, 0xd8, 0xff]).unwrap();

        let upload = ImageUpload::from_path(file.path()).await.unwrap();
        assert_eq!(upload.mime_type, "image/jpeg");
        assert_eq!(
            upload.to_part(),
            Part::InlineData {
                mime_type: "image/jpeg".to_string(),
                data: "/9j/".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn rejects_unsupported_extension_before_reading() {
        let err = ImageUpload::from_path(Path::new("/definitely/missing/fridge.gif"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType(_)));
    }

    #[tokio::test]
    async fn missing_and_empty_files_are_errors() {
        let err = ImageUpload::from_path(Path::new("/definitely/missing/fridge.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Read { .. }));

        let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        let err = ImageUpload::from_path(file.path()).await.unwrap_err();
        assert!(matches!(err, UploadError::Empty(_)));
    }

    #[tokio::test]
    async fn rejects_files_whose_encoding_exceeds_the_limit() {
        // under the raw limit, over it once base64 encoded
        let size = MAX_INLINE_BYTES * 3 / 4 + 1;
        assert!(size < MAX_INLINE_BYTES);

        let file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.as_file().set_len(size).unwrap();

        let err = ImageUpload::from_path(file.path()).await.unwrap_err();
        match err {
            UploadError::TooLarge { size: got, encoded, .. } => {
                assert_eq!(got, size);
                assert!(encoded > MAX_INLINE_BYTES);
            }
            other => panic!("expected TooLarge, got {:?}", other),
        }
    }

    #[test]
    fn encoded_length_rounds_up_to_whole_quads() {
        assert_eq!(encoded_len(1), 4);
        assert_eq!(encoded_len(3), 4);
        assert_eq!(encoded_len(4), 8);
        assert_eq!(encoded_len(MAX_INLINE_BYTES * 3 / 4), MAX_INLINE_BYTES);
    }
}
