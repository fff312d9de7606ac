//! Business logic services.
//!
//! - [`MemeStore`]: catalog, search results, likes, comments and uploads
//! - [`ProfileStore`]: the local user profile
//! - [`Session`]: both stores over one backend, plus startup hydration
//! - [`upload`]: caller-side validation and meme construction for uploads
//! - [`leaderboard`]: top memes and top users by likes
//!
//! Every store mutates in memory first and then writes the affected slice
//! through a single `persist` call. Hydration never fails: unreadable data
//! falls back to the default and is reported as [`Hydration::Recovered`].

pub mod leaderboard;
mod meme_store;
mod profile_store;
mod session;
pub mod upload;

pub use leaderboard::{Leaderboard, UserScore};
pub use meme_store::{MemeStore, Slice};
pub use profile_store::ProfileStore;
pub use session::{HydrationReport, Session};

use crate::storage::KeyValueStore;
use crate::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Outcome of hydrating one persisted slice.
#[derive(Debug)]
pub enum Hydration {
    /// Stored data was read and applied.
    Restored,
    /// Nothing was stored; the default applies.
    Absent,
    /// Stored data was unreadable; the default applies.
    Recovered(Error),
}

impl Hydration {
    /// Returns true if stored data was applied.
    #[must_use]
    pub const fn is_restored(&self) -> bool {
        matches!(self, Self::Restored)
    }

    /// Returns the recovered error, if the slice fell back after a failure.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        match self {
            Self::Recovered(e) => Some(e),
            Self::Restored | Self::Absent => None,
        }
    }
}

/// Reads and parses the slice under `key`.
///
/// Returns `None` alongside an `Absent` or `Recovered` outcome when the
/// caller should fall back to its default.
pub(crate) fn hydrate_slice<T, S>(storage: &S, key: &str) -> (Option<T>, Hydration)
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return (None, Hydration::Absent),
        Err(e) => return (None, recovered(key, &e.to_string())),
    };

    match serde_json::from_str(&raw) {
        Ok(value) => (Some(value), Hydration::Restored),
        Err(e) => (None, recovered(key, &e.to_string())),
    }
}

fn recovered(key: &str, cause: &str) -> Hydration {
    tracing::warn!(key, cause, "Stored slice unreadable, falling back to default");
    metrics::counter!("memeboard_hydration_recovered_total", "key" => key.to_string())
        .increment(1);
    Hydration::Recovered(Error::Hydration {
        key: key.to_string(),
        cause: cause.to_string(),
    })
}

/// Serializes `value` and writes it under `key`.
pub(crate) fn write_slice<T, S>(storage: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|e| Error::OperationFailed {
        operation: "serialize_slice".to_string(),
        cause: format!("{key}: {e}"),
    })?;
    storage.set(key, &json)
}
