//! # Memeboard
//!
//! Meme browsing and sharing core with persistent local state.
//!
//! Memeboard fetches the public meme catalog, lets a user search, filter,
//! sort and page through it, like and comment on memes, upload their own,
//! and keep a simple local profile. All state lives in explicitly owned
//! stores that mirror their durable slices to a key/value backend.
//!
//! ## Features
//!
//! - Catalog fetch with simulated engagement (likes, category, date)
//! - Case-insensitive search, category filter, likes/date sorting
//! - Likes and comments kept consistent with their persisted mirrors
//! - Pluggable persistence (in-memory, filesystem, `SQLite`)
//! - Upload helpers with image validation and caption suggestions
//!
//! ## Example
//!
//! ```rust,ignore
//! use memeboard::fetcher::ImgflipFetcher;
//! use memeboard::services::MemeStore;
//! use memeboard::storage::MemoryKeyValueStore;
//!
//! let mut store = MemeStore::new(MemoryKeyValueStore::new());
//! store.load_liked_memes();
//! store.fetch_catalog(&ImgflipFetcher::new()).await?;
//! store.search("drake");
//! store.toggle_like(&"181913649".into())?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod fetcher;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::{MemeboardConfig, StorageBackendType};
pub use fetcher::{CatalogFetcher, Enricher, ImgflipFetcher, RandomEnricher, RawMeme};
pub use models::{
    Category, CategoryFilter, Comment, FetchStatus, Meme, MemeId, Page, ProfileUpdate, SortKey,
    UserProfile,
};
pub use services::{Hydration, MemeStore, ProfileStore, Session};
pub use storage::{
    FilesystemKeyValueStore, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore,
};

/// Error type for memeboard operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `Fetch` | Catalog request fails, returns a bad status, or reports `success: false` |
/// | `Hydration` | A persisted slice cannot be read or parsed (carried in [`Hydration::Recovered`]) |
/// | `Validation` | Empty names/titles/comments, non-image uploads, oversized files |
/// | `InvalidInput` | Unknown category, sort key or backend names, unsafe storage keys |
/// | `OperationFailed` | Storage I/O, `SQLite`, serialization, config file errors |
#[derive(Debug, ThisError)]
pub enum Error {
    /// The remote catalog call failed or reported failure.
    ///
    /// Recoverable by fetching again; the store also records the message
    /// and moves to [`FetchStatus::Failed`].
    #[error("catalog fetch failed: {0}")]
    Fetch(String),

    /// A persisted slice was unreadable or unparsable.
    ///
    /// Never returned as `Err` from a hydration operation; the store falls
    /// back to the default value and reports this inside
    /// [`Hydration::Recovered`].
    #[error("could not hydrate '{key}': {cause}")]
    Hydration {
        /// The storage key being hydrated.
        key: String,
        /// The underlying cause.
        cause: String,
    },

    /// Caller-level validation rejected the input.
    ///
    /// Raised when:
    /// - A profile display name is blank
    /// - A comment or upload title is blank
    /// - An uploaded file is not an image or exceeds the size limit
    #[error("validation failed: {0}")]
    Validation(String),

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Filesystem or `SQLite` storage operations fail
    /// - A slice cannot be serialized
    /// - The config file cannot be read or parsed
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for memeboard operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Fetch("Failed to fetch memes".to_string());
        assert_eq!(err.to_string(), "catalog fetch failed: Failed to fetch memes");

        let err = Error::Hydration {
            key: "likedMemes".to_string(),
            cause: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "could not hydrate 'likedMemes': expected value"
        );

        let err = Error::OperationFailed {
            operation: "write_kv_file".to_string(),
            cause: "disk full".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'write_kv_file' failed: disk full");

        let err = Error::Validation("Please enter a display name.".to_string());
        assert_eq!(
            err.to_string(),
            "validation failed: Please enter a display name."
        );
    }
}
