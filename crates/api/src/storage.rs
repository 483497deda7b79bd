//! Local filesystem storage for uploaded photos.
//!
//! All photos live flat in one directory. Callers only ever see persisted
//! relative paths (`static/uploads/{file}`); this module maps them back to
//! files under the configured root and refuses anything that would escape it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use campo_core::uploads::{
    detect_photo_format, filename_from_stored, stored_path, timestamped_filename,
};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, AppResult};

/// Attempts at finding a free filename before giving up.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Upload directory on local disk.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    root: PathBuf,
}

impl UploadStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the upload directory if it does not exist yet.
    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Validate and write one photo, returning its persisted path.
    ///
    /// The content must sniff as JPEG, PNG or WebP. Existing files are never
    /// overwritten: on a name collision a `_{n}` suffix is added.
    pub async fn save_photo(&self, original_name: &str, bytes: &[u8]) -> AppResult<String> {
        let format = detect_photo_format(bytes)?;
        let base = timestamped_filename(original_name, format, chrono::Utc::now());

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = if attempt == 0 {
                base.clone()
            } else {
                with_suffix(&base, attempt)
            };
            let path = self.root.join(&file_name);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(AppError::InternalError(format!(
                        "Failed to create {}: {e}",
                        path.display()
                    )))
                }
            };

            file.write_all(bytes).await.map_err(|e| {
                AppError::InternalError(format!("Failed to write {}: {e}", path.display()))
            })?;
            file.flush().await.map_err(|e| {
                AppError::InternalError(format!("Failed to write {}: {e}", path.display()))
            })?;

            tracing::debug!(file = %file_name, size = bytes.len(), "Stored uploaded photo");
            return Ok(stored_path(&file_name));
        }

        Err(AppError::InternalError(format!(
            "Could not find a free filename for {base}"
        )))
    }

    /// Resolve a persisted path to a file under the root.
    pub fn resolve(&self, stored: &str) -> Option<PathBuf> {
        filename_from_stored(stored).map(|name| self.root.join(name))
    }

    /// Read a stored photo. Missing or unreadable files yield `None` and a
    /// warning; exports skip them rather than failing.
    pub async fn read(&self, stored: &str) -> Option<Vec<u8>> {
        let Some(path) = self.resolve(stored) else {
            tracing::warn!(path = stored, "Stored photo path is outside the upload directory");
            return None;
        };
        match tokio::fs::read(&path).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Stored photo is unreadable");
                None
            }
        }
    }

    /// Best-effort removal of stored photos. Failures are logged, never
    /// returned: the database row is the source of truth.
    pub async fn remove_all<'a, I>(&self, stored: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for path in stored {
            let Some(full) = self.resolve(path) else {
                continue;
            };
            match tokio::fs::remove_file(&full).await {
                Ok(()) => tracing::debug!(path = %full.display(), "Removed stored photo"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(
                        path = %full.display(),
                        error = %e,
                        "Failed to remove stored photo"
                    )
                }
            }
        }
    }
}

/// `name_123.jpg` -> `name_123_{n}.jpg`
fn with_suffix(file_name: &str, n: u32) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_{n}.{ext}"),
        None => format!("{file_name}_{n}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_BYTES: &[u8] = &[
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0,
    ];

    #[test]
    fn suffix_goes_before_extension() {
        assert_eq!(with_suffix("a_1.jpg", 2), "a_1_2.jpg");
        assert_eq!(with_suffix("noext", 3), "noext_3");
    }

    #[tokio::test]
    async fn save_read_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = UploadStorage::new(dir.path());

        let stored = storage.save_photo("ponte.png", PNG_BYTES).await.unwrap();
        assert!(stored.starts_with("static/uploads/ponte_"));
        assert!(stored.ends_with(".png"));

        let second = storage.save_photo("ponte.png", PNG_BYTES).await.unwrap();
        assert_ne!(stored, second);

        assert_eq!(storage.read(&stored).await.as_deref(), Some(PNG_BYTES));

        storage
            .remove_all([stored.as_str(), second.as_str()])
            .await;
        assert!(storage.read(&stored).await.is_none());
        assert!(storage.read(&second).await.is_none());
    }

    #[tokio::test]
    async fn save_rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let storage = UploadStorage::new(dir.path());

        let err = storage.save_photo("notes.txt", b"hello").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Core(campo_core::error::CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn resolve_refuses_escapes() {
        let storage = UploadStorage::new("/srv/uploads");
        assert_eq!(
            storage.resolve("static/uploads/a.jpg"),
            Some(PathBuf::from("/srv/uploads/a.jpg"))
        );
        assert_eq!(storage.resolve("static/uploads/../../etc/passwd"), None);
        assert!(storage.read("/etc/passwd").await.is_none());
    }
}
