//! Storage path validation.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Normalises a storage path and rejects anything that would leave the
/// storage root.
///
/// `.` components and repeated or trailing separators are dropped, `..`
/// is resolved as long as it stays inside the root. Null bytes, Windows
/// prefixes and paths that normalise to nothing are rejected with
/// [`InvalidPath`](crate::error::ErrorKind::InvalidPath).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use tome_storage::validate_path;
/// assert!(validate_path("qrcode42.png").is_ok());
/// assert!(validate_path("codes/../barcode42.png").is_ok());
/// assert!(validate_path("../qrcode42.png").is_err());
/// assert!(validate_path("a\0b").is_err());
/// assert_eq!(validate_path("./codes//qrcode42.png").unwrap(), Path::new("codes/qrcode42.png"));
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let invalid = || exn::Exn::from(ErrorKind::InvalidPath(original.to_path_buf()));
    let mut components = Vec::new();
    for component in original.components() {
        match component {
            // Null bytes survive Path::components() on Unix but truncate
            // paths in C syscalls.
            Component::Normal(s) if s.as_encoded_bytes().contains(&0) => return Err(invalid()),
            Component::Normal(s) => components.push(s),
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => return Err(invalid()),
            Component::ParentDir => {
                components.pop().ok_or_else(invalid)?;
            },
        }
    }
    if components.is_empty() {
        return Err(invalid());
    }
    Ok(components.into_iter().collect())
}
