//! Local filesystem storage backend.

use crate::error::ErrorKind;
use crate::{StorageBackend, error::Result, path::validate as validate_path};
use async_trait::async_trait;
use std::fs::create_dir_all as sync_create_dir;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;

/// Distinguishes temporary files of concurrent writes within one process.
static WRITE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Stores files in a directory on the local filesystem.
///
/// # Examples
///
/// ```no_run
/// use tome_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("codes", "/var/lib/tome/codes")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalBackend {
    name: String,
    root: PathBuf,
}
impl LocalBackend {
    /// Creates the root directory if it doesn't exist yet.
    ///
    /// # Errors
    ///
    /// [`InvalidPath`](ErrorKind::InvalidPath) if `root` is relative or is
    /// an existing non-directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidPath(root));
            }
        } else {
            // Blocking is fine here: it happens once, at startup.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root))?;
        }
        Ok(Self { name: name.into(), root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates a storage path and joins it onto the root.
    pub fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::try_exists(&abs_path).await.map_err(ErrorKind::Io)?)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::read(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        if let Some(parent) = abs_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, path))?;
        }
        // Write next to the target, then rename over it.
        let mut temporary = abs_path.clone().into_os_string();
        temporary.push(format!(".{}-{}.tmp", std::process::id(), WRITE_SEQUENCE.fetch_add(1, Ordering::Relaxed)));
        let temporary = PathBuf::from(temporary);
        if let Err(e) = fs::write(&temporary, data).await {
            _ = fs::remove_file(&temporary).await;
            exn::bail!(Self::map_io_error(e, path));
        }
        fs::rename(&temporary, &abs_path).await.map_err(|e| Self::map_io_error(e, path))?;
        tracing::debug!(backend = %self.name, path = %path.display(), bytes = data.len(), "file written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalBackend::new("codes", temp_dir.path()).is_ok());
        assert!(LocalBackend::new("codes", "relative/path").is_err());
    }

    #[test]
    fn test_new_creates_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("nested/codes");
        LocalBackend::new("codes", &root).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_new_rejects_file_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("file");
        std::fs::write(&file, b"x").unwrap();
        let err = LocalBackend::new("codes", &file).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[tokio::test]
    async fn test_write_read_overwrite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("codes", temp_dir.path()).unwrap();
        let path = Path::new("qrcode7.png");
        assert!(!backend.exists(path).await.unwrap());
        backend.write(path, b"first").await.unwrap();
        backend.write(path, b"second").await.unwrap();
        assert_eq!(backend.read(path).await.unwrap(), b"second");
        // No temporary files are left behind.
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_write_creates_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("codes", temp_dir.path()).unwrap();
        backend.write(Path::new("a/b/barcode7.png"), b"data").await.unwrap();
        assert!(temp_dir.path().join("a/b/barcode7.png").is_file());
    }

    #[tokio::test]
    async fn test_read_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("codes", temp_dir.path()).unwrap();
        let err = backend.read(Path::new("missing.png")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_io_error_mapping() {
        let path = Path::new("qrcode1.png");
        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(matches!(LocalBackend::map_io_error(denied, path), ErrorKind::PermissionDenied(p) if p == path));
        let missing = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert!(matches!(LocalBackend::map_io_error(missing, path), ErrorKind::NotFound(_)));
        let other = std::io::Error::other("disk on fire");
        assert!(matches!(LocalBackend::map_io_error(other, path), ErrorKind::Io(_)));
    }

    #[tokio::test]
    async fn test_path_security() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("codes", temp_dir.path()).unwrap();
        assert!(backend.read(Path::new("../etc/passwd")).await.is_err());
        assert!(backend.write(Path::new("a/../../escape.png"), b"data").await.is_err());
        assert!(backend.exists(Path::new("..")).await.is_err());
    }
}
