//! Logo upload validation
//!
//! Checks run before any decoding starts; a rejected file never touches the
//! style options.

use thiserror::Error;

use crate::config::MAX_UPLOAD_BYTES;

/// What the file input tells us about the selected file
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMeta {
    pub name: String,
    /// MIME type reported by the browser (may be empty)
    pub mime: String,
    /// Size in bytes
    pub size: u64,
}

/// Reasons an upload is refused. The Display text is shown to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Error: File is not supported.")]
    UnsupportedFormat { mime: String },

    #[error("Error: Maximum file size is 2 MB")]
    TooLarge { size: u64 },
}

/// Accept only `image/*` files up to `MAX_UPLOAD_BYTES`
pub fn validate_upload(meta: &UploadMeta) -> Result<(), UploadError> {
    if !meta.mime.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(UploadError::UnsupportedFormat {
            mime: meta.mime.clone(),
        });
    }

    if meta.size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge { size: meta.size });
    }

    Ok(())
}
