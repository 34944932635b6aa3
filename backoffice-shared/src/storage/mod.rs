/// File storage
///
/// Uploaded images are written through the [`FileStorage`] trait so the API
/// does not care where bytes end up. [`local::LocalStorage`] keeps them in a
/// directory that the API serves under `/uploads`.
///
/// Paths handed to a backend are relative storage paths such as
/// `avatars/1728497996-9f2c4e1a.png`; they are what the database stores.
///
/// # Modules
///
/// - [`local`]: Local-directory backend
/// - [`upload`]: Image upload rules (types, size, naming, placeholders)

use async_trait::async_trait;
use bytes::Bytes;

pub mod local;
pub mod upload;

pub use local::LocalStorage;

/// Errors from a storage backend
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Path is empty, absolute or escapes the storage root
    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage backend for uploaded files
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Writes `bytes` at `path`, replacing any existing file
    async fn put(&self, path: &str, bytes: Bytes) -> Result<(), StorageError>;

    /// Removes the file at `path`; a missing file is not an error
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Public URL clients use to fetch `path`
    fn public_url(&self, path: &str) -> String;
}
