//! Storage backend trait and implementations.

mod local;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::local::LocalBackend;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockBackend;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Unified interface for storage backends.
///
/// All paths are relative to the storage root and are validated with
/// [`validate_path`](crate::validate_path) by every implementation.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use tome_storage::{backend::StorageBackend, error::Result};
///
/// async fn cached_or_render(backend: &dyn StorageBackend, render: impl FnOnce() -> Vec<u8>) -> Result<Vec<u8>> {
///     let path = Path::new("qrcode42.png");
///     if backend.exists(path).await? {
///         return backend.read(path).await;
///     }
///     let data = render();
///     backend.write(path, &data).await?;
///     Ok(data)
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend, used for logging only.
    fn name(&self) -> &str;

    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Creates or replaces the file, creating parent directories as needed.
    /// Readers never observe a partially written file.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()>;
}
