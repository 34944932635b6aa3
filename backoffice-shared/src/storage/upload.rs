/// Image upload rules
///
/// Accepted types are JPEG, PNG, GIF and SVG up to 2048 KiB by default. A
/// stored file is named `<unix timestamp>-<8 hex chars>.<ext>` inside its
/// directory (`avatars/` or `stores/`). Placeholder images are never deleted
/// when replaced.

use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use super::{FileStorage, StorageError};

/// Content types accepted for images
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/jpg",
    "image/gif",
    "image/svg+xml",
];

/// 2048 KiB
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 2048 * 1024;

/// Directory for user avatars
pub const AVATAR_DIR: &str = "avatars";

/// Directory for store images
pub const STORE_IMAGE_DIR: &str = "stores";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("The file must be an image of type: jpeg, png, jpg, gif, svg")]
    UnsupportedType(String),

    #[error("The file may not be greater than {max_kib} kilobytes")]
    TooLarge { size: usize, max_kib: usize },

    #[error("The uploaded file is empty")]
    Empty,

    #[error("The file content does not match its declared type")]
    ContentMismatch,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// An image received in a multipart form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub content_type: String,
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

/// File extension for an accepted content type
pub fn ext_from_mime(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    }
}

fn content_matches(ext: &str, bytes: &[u8]) -> bool {
    match ext {
        "jpg" => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
        "png" => bytes.starts_with(&[0x89, b'P', b'N', b'G']),
        "gif" => bytes.starts_with(b"GIF8"),
        "svg" => {
            let head = &bytes[..bytes.len().min(1024)];
            String::from_utf8_lossy(head).contains("<svg")
        }
        _ => false,
    }
}

/// Checks type, size and content of an upload
///
/// # Returns
///
/// The extension the stored file will use
pub fn validate_image(upload: &ImageUpload, max_bytes: usize) -> Result<&'static str, UploadError> {
    let content_type = upload
        .content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let ext = ext_from_mime(&content_type)
        .ok_or_else(|| UploadError::UnsupportedType(content_type.clone()))?;

    if upload.bytes.is_empty() {
        return Err(UploadError::Empty);
    }

    if upload.bytes.len() > max_bytes {
        return Err(UploadError::TooLarge {
            size: upload.bytes.len(),
            max_kib: max_bytes / 1024,
        });
    }

    if !content_matches(ext, &upload.bytes) {
        return Err(UploadError::ContentMismatch);
    }

    Ok(ext)
}

/// `<unix timestamp>-<8 hex chars>.<ext>`
pub fn timestamped_name(ext: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}.{}", Utc::now().timestamp(), &suffix[..8], ext)
}

/// True for the shared placeholder images that uploads replace
pub fn is_placeholder(path: &str) -> bool {
    path.starts_with("avatars/default/") || path == crate::models::store::DEFAULT_STORE_IMAGE
}

/// Validates and writes an image under `dir`
///
/// # Returns
///
/// The storage path to persist, e.g. `avatars/1728497996-9f2c4e1a.png`
pub async fn store_image(
    storage: &dyn FileStorage,
    dir: &str,
    upload: &ImageUpload,
    max_bytes: usize,
) -> Result<String, UploadError> {
    let ext = validate_image(upload, max_bytes)?;
    let path = format!("{}/{}", dir, timestamped_name(ext));

    storage.put(&path, upload.bytes.clone()).await?;

    tracing::info!(
        path = %path,
        original = upload.file_name.as_deref().unwrap_or("-"),
        size = upload.bytes.len(),
        "Stored uploaded image"
    );

    Ok(path)
}

/// Deletes a replaced file, logging instead of failing
///
/// Placeholders and empty paths are left alone.
pub async fn discard_replaced(storage: &dyn FileStorage, previous: Option<&str>) {
    let Some(path) = previous.filter(|p| !p.is_empty() && !is_placeholder(p)) else {
        return;
    };

    if let Err(e) = storage.delete(path).await {
        tracing::warn!(path, error = %e, "Failed to delete replaced file");
    }
}
