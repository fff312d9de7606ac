//! Storage layer abstraction.
//!
//! Every durable slice of state is a JSON string under a fixed key in a
//! [`KeyValueStore`]. Three backends are provided:
//! - **Memory**: volatile, for tests and ephemeral sessions
//! - **Filesystem**: one `<key>.json` file per key
//! - **`SQLite`**: a single `kv` table

pub mod persistence;
pub mod sqlite;
pub mod traits;

pub use persistence::{FilesystemKeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
pub use traits::KeyValueStore;

use crate::Result;
use crate::config::{MemeboardConfig, StorageBackendType};

/// Fixed storage keys, one per persisted slice.
///
/// The names match the local-storage keys of the browser client so
/// exported data stays interchangeable.
pub mod keys {
    /// JSON array of liked meme IDs.
    pub const LIKED_MEMES: &str = "likedMemes";
    /// JSON array of memes uploaded by the local user.
    pub const USER_MEMES: &str = "userMemes";
    /// JSON object mapping meme ID to its comments.
    pub const MEME_COMMENTS: &str = "memeComments";
    /// JSON object with the local user profile.
    pub const USER_PROFILE: &str = "userProfile";
    /// JSON number seeding catalog enrichment.
    pub const ENRICHMENT_SEED: &str = "enrichmentSeed";
}

/// File name of the `SQLite` database inside the data directory.
pub const SQLITE_FILE_NAME: &str = "memeboard.db";

/// Opens the backend selected by `config`.
///
/// # Errors
///
/// Returns an error if the data directory or database cannot be opened.
pub fn open_backend(config: &MemeboardConfig) -> Result<Box<dyn KeyValueStore>> {
    let backend: Box<dyn KeyValueStore> = match config.backend {
        StorageBackendType::Memory => Box::new(MemoryKeyValueStore::new()),
        StorageBackendType::Filesystem => {
            Box::new(FilesystemKeyValueStore::new(&config.data_dir)?)
        },
        StorageBackendType::Sqlite => Box::new(SqliteKeyValueStore::new(
            config.data_dir.join(SQLITE_FILE_NAME),
        )?),
    };
    tracing::debug!(
        backend = backend.backend_name(),
        data_dir = %config.data_dir.display(),
        "Opened storage backend"
    );
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    #[test_case(StorageBackendType::Memory, "memory")]
    #[test_case(StorageBackendType::Filesystem, "filesystem")]
    #[test_case(StorageBackendType::Sqlite, "sqlite")]
    fn test_open_backend_honours_config(backend: StorageBackendType, expected: &str) {
        let Ok(dir) = TempDir::new() else {
            panic!("temp dir should be creatable");
        };
        let config = MemeboardConfig::default()
            .with_data_dir(dir.path())
            .with_backend(backend);
        let Ok(store) = open_backend(&config) else {
            panic!("backend should open");
        };
        assert_eq!(store.backend_name(), expected);
        assert!(store.set(keys::LIKED_MEMES, "[]").is_ok());
        assert_eq!(store.get(keys::LIKED_MEMES).ok().flatten().as_deref(), Some("[]"));
    }
}
