//! Media storage abstraction and key layout.
//!
//! Records keep storage keys (paths relative to the media root); URLs are
//! derived from keys through [`StorageBackend::public_url`].

use std::path::PathBuf;
use std::sync::Arc;

use crate::{AppError, AppResult};

/// Uploaded file metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Storage key (path relative to the media root).
    pub key: String,
    /// Public URL to access the file.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
    /// MD5 hash of the file.
    pub md5: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Upload a file, replacing any file stored under the same key.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str)
    -> AppResult<UploadedFile>;

    /// Delete a file. Deleting a missing file is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Move a file to another key, replacing whatever is stored there.
    async fn rename(&self, from: &str, to: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;

    /// Check if a file exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;
}

/// Shared handle to the configured storage backend.
pub type StorageService = Arc<dyn StorageBackend>;

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        let path = self.base_path.join(key);

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))?;

        let md5 = format!("{:x}", md5::compute(data));

        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            md5,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.base_path.join(key);
        if path.exists() {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> AppResult<()> {
        let target = self.base_path.join(to);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }
        tokio::fs::rename(self.base_path.join(from), &target)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to move file: {e}")))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.base_path.join(key);
        Ok(path.exists())
    }
}

/// Storage backend that discards writes. Used in tests.
#[derive(Clone, Default)]
pub struct NoOpStorage {
    base_url: String,
}

impl NoOpStorage {
    /// Create a new no-op storage backend.
    #[must_use]
    pub const fn new(base_url: String) -> Self {
        Self { base_url }
    }
}

#[async_trait::async_trait]
impl StorageBackend for NoOpStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            md5: format!("{:x}", md5::compute(data)),
        })
    }

    async fn delete(&self, _key: &str) -> AppResult<()> {
        Ok(())
    }

    async fn rename(&self, _from: &str, _to: &str) -> AppResult<()> {
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn exists(&self, _key: &str) -> AppResult<bool> {
        Ok(false)
    }
}

/// Storage key layout for exhibit media.
pub mod keys {
    /// Lower-cased extension of an uploaded file name, `bin` when absent.
    #[must_use]
    pub fn extension(original_name: &str) -> String {
        original_name
            .rfind('.')
            .filter(|&pos| pos > 0 && pos < original_name.len() - 1)
            .map(|pos| &original_name[pos + 1..])
            .filter(|ext| ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map_or_else(|| "bin".to_string(), str::to_ascii_lowercase)
    }

    /// Generated QR label: `exhibits/qr_codes/<slug>.png`.
    #[must_use]
    pub fn qr_code(slug: &str) -> String {
        format!("exhibits/qr_codes/{slug}.png")
    }

    /// Flat display photo: `exhibits/<slug>/single/single.<ext>`.
    #[must_use]
    pub fn single_image(slug: &str, original_name: &str) -> String {
        format!("exhibits/{slug}/single/single.{}", extension(original_name))
    }

    /// Folder holding the 360-degree frames of an exhibit.
    #[must_use]
    pub fn frames_folder(slug: &str) -> String {
        format!("exhibits/{slug}/frames/")
    }

    /// One 360-degree frame: `exhibits/<slug>/frames/frame-<idx:03>.<ext>`.
    #[must_use]
    pub fn frame(slug: &str, frame_index: i32, original_name: &str) -> String {
        format!(
            "{}frame-{frame_index:03}.{}",
            frames_folder(slug),
            extension(original_name)
        )
    }

    /// Upload in progress: `exhibits/<slug>/uploads/<stem>.<ext>`.
    ///
    /// Frames land here first and are moved to their `frame-NNN` name once
    /// the row holding that index is committed.
    #[must_use]
    pub fn staging(slug: &str, stem: &str, original_name: &str) -> String {
        format!(
            "exhibits/{slug}/uploads/{stem}.{}",
            extension(original_name)
        )
    }

    /// Gallery photo: `exhibits/<slug>/gallery/<stem>.<ext>`.
    #[must_use]
    pub fn gallery(slug: &str, stem: &str, original_name: &str) -> String {
        format!(
            "exhibits/{slug}/gallery/{stem}.{}",
            extension(original_name)
        )
    }

    /// Narration track: `exhibits/<slug>/audio/<lang>/<stem>.<ext>`.
    #[must_use]
    pub fn audio(slug: &str, lang: &str, stem: &str, original_name: &str) -> String {
        format!(
            "exhibits/{slug}/audio/{lang}/{stem}.{}",
            extension(original_name)
        )
    }
}
