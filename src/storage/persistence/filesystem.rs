//! Filesystem-based key/value backend.
//!
//! Stores each key as `<base>/<key>.json`, mirroring how a browser keeps
//! one string per local-storage key.
//!
//! # Security
//!
//! - **Path traversal**: keys are validated to prevent directory escape
//! - **File size limits**: oversized files are refused on read

use crate::storage::sqlite::record_operation_metrics;
use crate::storage::traits::KeyValueStore;
use crate::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::instrument;

/// Maximum size of a stored value (16 MiB).
///
/// Uploaded memes are kept as `data:` URLs, so the uploads slice can grow
/// to several images' worth of base64.
const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Filesystem-based key/value backend.
#[derive(Debug, Clone)]
pub struct FilesystemKeyValueStore {
    /// Base directory for storage.
    base_path: PathBuf,
}

impl FilesystemKeyValueStore {
    /// Creates a backend rooted at `base_path`, creating the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).map_err(|e| Error::OperationFailed {
            operation: "create_storage_dir".to_string(),
            cause: format!("{}: {e}", base_path.display()),
        })?;

        Ok(Self { base_path })
    }

    /// Returns the base path.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the file path for a key.
    fn key_path(&self, key: &str) -> Result<PathBuf> {
        if !Self::is_safe_key(key) {
            return Err(Error::InvalidInput(format!(
                "storage key contains invalid characters: {key}"
            )));
        }
        Ok(self.base_path.join(format!("{key}.json")))
    }

    /// Checks that a key is a plain file stem (no separators, no dots).
    fn is_safe_key(key: &str) -> bool {
        !key.is_empty()
            && key.len() <= 128
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;

        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::OperationFailed {
                    operation: "read_kv_metadata".to_string(),
                    cause: e.to_string(),
                });
            },
        };

        if metadata.len() > MAX_FILE_SIZE {
            return Err(Error::OperationFailed {
                operation: "read_kv_file".to_string(),
                cause: format!(
                    "{} exceeds maximum size of {MAX_FILE_SIZE} bytes",
                    path.display()
                ),
            });
        }

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| Error::OperationFailed {
                operation: "read_kv_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;

        // Replace via a sibling temp file; readers see the old or new value
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| Error::OperationFailed {
            operation: "write_kv_file".to_string(),
            cause: format!("{}: {e}", tmp.display()),
        })?;
        fs::rename(&tmp, &path).map_err(|e| Error::OperationFailed {
            operation: "rename_kv_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })
    }
}

impl KeyValueStore for FilesystemKeyValueStore {
    #[instrument(skip(self), fields(backend = "filesystem"))]
    fn get(&self, key: &str) -> Result<Option<String>> {
        let start = Instant::now();
        let result = self.read(key);
        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("filesystem", "get", start, status);
        result
    }

    #[instrument(skip(self, value), fields(backend = "filesystem", bytes = value.len()))]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let start = Instant::now();
        let result = self.write(key, value);
        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics("filesystem", "set", start, status);
        result
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}
