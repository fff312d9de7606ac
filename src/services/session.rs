//! Session wiring.
//!
//! A [`Session`] owns both stores over one shared backend and runs the
//! caller-side validation that the stores themselves skip.
//!
//! Sessions opened from config enrich the catalog from a seed kept in the
//! backend, so separate processes on the same data directory see the same
//! likes, categories and page boundaries.

use super::leaderboard::Leaderboard;
use super::upload::UploadRequest;
use super::{Hydration, MemeStore, ProfileStore, hydrate_slice, write_slice};
use crate::config::MemeboardConfig;
use crate::fetcher::{CatalogFetcher, RandomEnricher};
use crate::models::{Comment, MemeId, ProfileUpdate};
use crate::storage::{KeyValueStore, keys, open_backend};
use crate::{Error, Result};
use chrono::Utc;
use std::sync::Arc;

/// Per-slice outcome of [`Session::hydrate`].
#[derive(Debug)]
pub struct HydrationReport {
    /// Liked-id set.
    pub liked: Hydration,
    /// Uploads.
    pub uploads: Hydration,
    /// Comment mirror.
    pub comments: Hydration,
    /// Profile.
    pub profile: Hydration,
}

impl HydrationReport {
    /// Returns the errors of every slice that fell back to its default.
    pub fn recovered(&self) -> impl Iterator<Item = &Error> {
        [&self.liked, &self.uploads, &self.comments, &self.profile]
            .into_iter()
            .filter_map(Hydration::error)
    }
}

/// Both stores over one backend.
pub struct Session<S: KeyValueStore + ?Sized> {
    memes: MemeStore<Arc<S>>,
    profile: ProfileStore<Arc<S>>,
}

impl Session<dyn KeyValueStore> {
    /// Opens the backend selected by `config` and builds a session on it.
    ///
    /// The meme store enriches with the backend's persisted seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be opened.
    pub fn open(config: &MemeboardConfig) -> Result<Self> {
        let storage: Arc<dyn KeyValueStore> = Arc::from(open_backend(config)?);
        let seed = enrichment_seed(storage.as_ref());
        let memes = MemeStore::new(Arc::clone(&storage))
            .with_enricher(RandomEnricher::seeded(seed))
            .with_trending_limit(config.trending_limit);
        Ok(Self::new(storage).with_meme_store(memes))
    }
}

/// Returns the stored enrichment seed, creating and storing one if missing
/// or unreadable.
///
/// A seed that cannot be written is still used for this session.
fn enrichment_seed<S: KeyValueStore + ?Sized>(storage: &S) -> u64 {
    if let (Some(seed), _) = hydrate_slice::<u64, _>(storage, keys::ENRICHMENT_SEED) {
        return seed;
    }

    let seed = rand::random::<u64>();
    if let Err(e) = write_slice(storage, keys::ENRICHMENT_SEED, &seed) {
        tracing::warn!(error = %e, "Enrichment seed not persisted");
    }
    tracing::debug!(seed, "Created enrichment seed");
    seed
}

impl<S: KeyValueStore + ?Sized> Session<S> {
    /// Creates a session whose stores share `storage`.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            memes: MemeStore::new(Arc::clone(&storage)),
            profile: ProfileStore::new(storage),
        }
    }

    /// Replaces the meme store, e.g. to install a deterministic enricher.
    #[must_use]
    pub fn with_meme_store(mut self, memes: MemeStore<Arc<S>>) -> Self {
        self.memes = memes;
        self
    }

    /// Loads every persisted slice.
    pub fn hydrate(&mut self) -> HydrationReport {
        let report = HydrationReport {
            liked: self.memes.load_liked_memes(),
            uploads: self.memes.load_user_memes(),
            comments: self.memes.load_comments(),
            profile: self.profile.load_profile(),
        };
        for error in report.recovered() {
            tracing::warn!(error = %error, "Hydration fell back to default");
        }
        report
    }

    /// Fetches the catalog unless a fetch was already issued.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`] if the fetch fails.
    pub async fn ensure_catalog<F: CatalogFetcher>(&mut self, fetcher: &F) -> Result<()> {
        if !self.memes.should_fetch() {
            return Ok(());
        }
        self.memes.fetch_catalog(fetcher).await
    }

    /// Adds a comment authored by the profile user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for blank text, or a persistence error.
    pub fn comment(&mut self, meme_id: &MemeId, text: &str) -> Result<bool> {
        let comment = Comment::new(text.trim(), self.profile.profile().name.clone())?;
        self.memes.add_comment(meme_id, comment)
    }

    /// Validates an upload and stores it as the profile user's meme.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for invalid uploads, or a persistence
    /// error.
    pub fn upload(&mut self, request: UploadRequest) -> Result<MemeId> {
        let meme = request.into_meme(&self.profile.profile().name, Utc::now())?;
        let id = meme.id.clone();
        self.memes.add_user_meme(meme)?;
        Ok(id)
    }

    /// Validates and applies a profile update.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank name, or a persistence error.
    pub fn edit_profile(&mut self, update: ProfileUpdate) -> Result<()> {
        self.profile.update_profile(update.validated()?)
    }

    /// Ranks memes and users over the catalog and uploads.
    pub fn leaderboard(&self, limit: usize) -> Leaderboard<'_> {
        Leaderboard::build(
            self.memes
                .catalog()
                .iter()
                .chain(self.memes.user_memes().iter()),
            limit,
        )
    }

    /// Returns the meme store.
    pub const fn memes(&self) -> &MemeStore<Arc<S>> {
        &self.memes
    }

    /// Returns the meme store mutably.
    pub const fn memes_mut(&mut self) -> &mut MemeStore<Arc<S>> {
        &mut self.memes
    }

    /// Returns the profile store.
    pub const fn profile(&self) -> &ProfileStore<Arc<S>> {
        &self.profile
    }

    /// Returns the profile store mutably.
    pub const fn profile_mut(&mut self) -> &mut ProfileStore<Arc<S>> {
        &mut self.profile
    }
}
