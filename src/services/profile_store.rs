//! Profile store.

use super::{Hydration, hydrate_slice, write_slice};
use crate::Result;
use crate::models::{ProfileUpdate, UserProfile};
use crate::storage::{KeyValueStore, keys};
use tracing::instrument;

/// Store for the single local user profile.
///
/// Blank names are not rejected here; callers run
/// [`ProfileUpdate::validated`] first.
pub struct ProfileStore<S> {
    storage: S,
    profile: UserProfile,
}

impl<S: KeyValueStore> ProfileStore<S> {
    /// Creates a store holding the placeholder profile.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            profile: UserProfile::default(),
        }
    }

    /// Merges `update` into the profile and persists the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be persisted; the merged
    /// profile is kept in memory either way.
    #[instrument(skip_all, fields(operation = "update_profile"))]
    pub fn update_profile(&mut self, update: ProfileUpdate) -> Result<()> {
        self.profile = self.profile.merged(update);
        self.persist()
    }

    /// Replaces the profile with the stored one, or the placeholder.
    pub fn load_profile(&mut self) -> Hydration {
        let (stored, outcome) = hydrate_slice::<UserProfile, _>(&self.storage, keys::USER_PROFILE);
        self.profile = stored.unwrap_or_default();
        outcome
    }

    /// Writes the full profile to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn persist(&self) -> Result<()> {
        write_slice(&self.storage, keys::USER_PROFILE, &self.profile).inspect_err(|e| {
            tracing::error!(key = keys::USER_PROFILE, error = %e, "Failed to persist profile");
        })
    }

    /// Returns the current profile.
    pub const fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Returns the storage backend.
    pub const fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{DEFAULT_BIO, DEFAULT_NAME, DEFAULT_PICTURE};
    use crate::storage::MemoryKeyValueStore;

    #[test]
    fn test_update_merges_and_persists() {
        let mut store = ProfileStore::new(MemoryKeyValueStore::new());
        assert!(store.update_profile(ProfileUpdate::default().with_bio("x")).is_ok());
        assert_eq!(store.profile().name, DEFAULT_NAME);
        assert_eq!(store.profile().bio, "x");

        let stored = store.storage().get(keys::USER_PROFILE).ok().flatten();
        let Some(stored) = stored else {
            panic!("profile should be persisted");
        };
        assert!(stored.contains(r#""profilePicture":"/placeholder.svg?height=200&width=200""#));
        assert!(stored.contains(r#""bio":"x""#));
    }

    #[test]
    fn test_store_does_not_validate_name() {
        let mut store = ProfileStore::new(MemoryKeyValueStore::new());
        assert!(store.update_profile(ProfileUpdate::default().with_name("")).is_ok());
        assert_eq!(store.profile().name, "");
    }

    #[test]
    fn test_load_roundtrips_through_storage() {
        let storage = MemoryKeyValueStore::with_entries([(
            keys::USER_PROFILE,
            r#"{"name":"Doge","bio":"wow","profilePicture":"https://x/doge.png"}"#,
        )]);
        let mut store = ProfileStore::new(storage);
        assert!(store.load_profile().is_restored());
        assert_eq!(store.profile().name, "Doge");
        assert_eq!(store.profile().profile_picture, "https://x/doge.png");
    }

    #[test]
    fn test_load_malformed_falls_back_to_placeholder() {
        let storage = MemoryKeyValueStore::with_entries([(keys::USER_PROFILE, "{\"name\":")]);
        let mut store = ProfileStore::new(storage);
        store.profile.name = "stale".to_string();

        let outcome = store.load_profile();
        assert!(outcome.error().is_some());
        assert_eq!(store.profile(), &UserProfile::default());
        assert_eq!(store.profile().bio, DEFAULT_BIO);
        assert_eq!(store.profile().profile_picture, DEFAULT_PICTURE);
    }
}
