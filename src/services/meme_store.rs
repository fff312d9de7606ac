//! Meme store.
//!
//! Owns the catalog and every view derived from it. Trending and search
//! results are kept as positions into the catalog, so like and comment
//! updates show up in every view without copying memes around. Positions
//! stay valid because the catalog only changes shape when a fetch
//! replaces it, and every fetch rebuilds the views.

use super::{Hydration, hydrate_slice, write_slice};
use crate::config::DEFAULT_TRENDING_LIMIT;
use crate::fetcher::{CatalogFetcher, Enricher, RandomEnricher, RawMeme};
use crate::models::{CategoryFilter, Comment, FetchStatus, Meme, MemeId, SortKey};
use crate::storage::{KeyValueStore, keys};
use crate::{Error, Result};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::instrument;

/// A persisted slice of meme state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    /// The liked-id set.
    LikedIds,
    /// Memes uploaded by the local user.
    UserMemes,
    /// Meme ID to comments map.
    Comments,
}

impl Slice {
    /// Returns the storage key for this slice.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::LikedIds => keys::LIKED_MEMES,
            Self::UserMemes => keys::USER_MEMES,
            Self::Comments => keys::MEME_COMMENTS,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum LikeDelta {
    Add,
    Remove,
}

/// Store for the meme catalog and the local user's interactions with it.
pub struct MemeStore<S> {
    storage: S,
    enricher: Box<dyn Enricher>,
    trending_limit: usize,
    catalog: Vec<Meme>,
    trending: Vec<usize>,
    results: Vec<usize>,
    user_memes: Vec<Meme>,
    liked: BTreeSet<MemeId>,
    comments: BTreeMap<MemeId, Vec<Comment>>,
    status: FetchStatus,
    error: Option<String>,
    selected: Option<MemeId>,
}

impl<S: KeyValueStore> MemeStore<S> {
    /// Creates an empty store over `storage` with random enrichment.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            enricher: Box::new(RandomEnricher::new()),
            trending_limit: DEFAULT_TRENDING_LIMIT,
            catalog: Vec::new(),
            trending: Vec::new(),
            results: Vec::new(),
            user_memes: Vec::new(),
            liked: BTreeSet::new(),
            comments: BTreeMap::new(),
            status: FetchStatus::Idle,
            error: None,
            selected: None,
        }
    }

    /// Replaces the enricher used on fetched catalogs.
    #[must_use]
    pub fn with_enricher(mut self, enricher: impl Enricher + 'static) -> Self {
        self.enricher = Box::new(enricher);
        self
    }

    /// Sets the size of the trending subset.
    #[must_use]
    pub const fn with_trending_limit(mut self, limit: usize) -> Self {
        self.trending_limit = limit;
        self
    }

    // ------------------------------------------------------------------
    // Catalog fetch
    // ------------------------------------------------------------------

    /// Returns true if no fetch has been issued yet.
    ///
    /// Callers check this before [`fetch_catalog`](Self::fetch_catalog);
    /// the store itself does not enforce a single fetch.
    pub fn should_fetch(&self) -> bool {
        self.status == FetchStatus::Idle
    }

    /// Fetches, enriches and installs the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`] if the fetcher fails. The status is then
    /// [`FetchStatus::Failed`] and [`error`](Self::error) holds the message.
    #[instrument(skip_all, fields(operation = "fetch_catalog"))]
    pub async fn fetch_catalog<F: CatalogFetcher>(&mut self, fetcher: &F) -> Result<()> {
        self.begin_fetch();
        let result = fetcher.fetch().await;
        self.complete_fetch(result)
    }

    /// Marks a fetch as in flight.
    pub fn begin_fetch(&mut self) {
        self.status = FetchStatus::Loading;
    }

    /// Applies the result of a fetch, whenever it arrives.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure as [`Error::Fetch`].
    pub fn complete_fetch(&mut self, result: Result<Vec<RawMeme>>) -> Result<()> {
        match result {
            Ok(raw) => {
                self.install_catalog(raw);
                self.status = FetchStatus::Succeeded;
                self.error = None;
                metrics::counter!("memeboard_catalog_fetches_total", "status" => "success")
                    .increment(1);
                tracing::info!(
                    memes = self.catalog.len(),
                    trending = self.trending.len(),
                    "Catalog installed"
                );
                Ok(())
            },
            Err(e) => {
                let message = match e {
                    Error::Fetch(message) => message,
                    other => other.to_string(),
                };
                self.status = FetchStatus::Failed;
                self.error = Some(message.clone());
                metrics::counter!("memeboard_catalog_fetches_total", "status" => "error")
                    .increment(1);
                tracing::warn!(error = %message, "Catalog fetch failed");
                Err(Error::Fetch(message))
            },
        }
    }

    fn install_catalog(&mut self, raw: Vec<RawMeme>) {
        let now = Utc::now();
        let mut seen = HashSet::with_capacity(raw.len());
        let mut catalog = Vec::with_capacity(raw.len());
        for record in raw {
            if !seen.insert(record.id.clone()) {
                tracing::warn!(id = %record.id, "Dropping duplicate catalog entry");
                continue;
            }
            let mut meme = self.enricher.enrich(record, now);
            if let Some(stored) = self.comments.get(&meme.id) {
                meme.comments.clone_from(stored);
            }
            if self.liked.contains(&meme.id) {
                meme.likes = meme.likes.saturating_add(1);
            }
            catalog.push(meme);
        }

        self.catalog = catalog;
        self.trending = top_by_likes(&self.catalog, self.trending_limit);
        self.results = (0..self.catalog.len()).collect();
    }

    // ------------------------------------------------------------------
    // Search, filter, sort, select
    // ------------------------------------------------------------------

    /// Sets the results to catalog memes whose name contains `query`,
    /// ignoring case. An empty query selects the whole catalog.
    #[instrument(skip(self))]
    pub fn search(&mut self, query: &str) {
        let needle = query.to_lowercase();
        self.results = self
            .catalog
            .iter()
            .enumerate()
            .filter(|(_, meme)| meme.name.to_lowercase().contains(&needle))
            .map(|(idx, _)| idx)
            .collect();
        tracing::debug!(matches = self.results.len(), "Search applied");
    }

    /// Sets the results to catalog memes in one category.
    ///
    /// [`CategoryFilter::All`] leaves the results unchanged.
    pub fn filter_by_category(&mut self, filter: CategoryFilter) {
        let CategoryFilter::Only(category) = filter else {
            return;
        };
        self.results = self
            .catalog
            .iter()
            .enumerate()
            .filter(|(_, meme)| meme.category == Some(category))
            .map(|(idx, _)| idx)
            .collect();
    }

    /// Re-orders the current results. The sort is stable.
    ///
    /// - [`SortKey::Likes`]: most liked first
    /// - [`SortKey::Date`]: most recent first, undated memes last
    pub fn sort_results(&mut self, key: SortKey) {
        let catalog = &self.catalog;
        match key {
            SortKey::Likes => self
                .results
                .sort_by(|&a, &b| catalog[b].likes.cmp(&catalog[a].likes)),
            SortKey::Date => self
                .results
                .sort_by(|&a, &b| catalog[b].date.cmp(&catalog[a].date)),
        }
    }

    /// Selects the catalog meme with `id`, or clears the selection.
    ///
    /// Uploads are not searched. Returns whether a meme was selected.
    pub fn select_meme(&mut self, id: &MemeId) -> bool {
        self.selected = self
            .catalog
            .iter()
            .any(|meme| &meme.id == id)
            .then(|| id.clone());
        self.selected.is_some()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Flips whether `id` is liked and moves its like count with it.
    ///
    /// The count goes up by one when liking and down by one (never below
    /// zero) when unliking. Membership toggles even if `id` is not in the
    /// catalog. Returns whether `id` is liked afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the liked set cannot be persisted; the in-memory
    /// toggle has already been applied.
    #[instrument(skip(self), fields(meme.id = %id))]
    pub fn toggle_like(&mut self, id: &MemeId) -> Result<bool> {
        let liked = if self.liked.remove(id) {
            self.adjust_likes(id, LikeDelta::Remove);
            false
        } else {
            self.liked.insert(id.clone());
            self.adjust_likes(id, LikeDelta::Add);
            true
        };

        let action = if liked { "like" } else { "unlike" };
        metrics::counter!("memeboard_likes_toggled_total", "action" => action).increment(1);

        self.persist(Slice::LikedIds)?;
        Ok(liked)
    }

    fn adjust_likes(&mut self, id: &MemeId, delta: LikeDelta) {
        let Some(meme) = self.catalog.iter_mut().find(|meme| &meme.id == id) else {
            return;
        };
        meme.likes = match delta {
            LikeDelta::Add => meme.likes.saturating_add(1),
            LikeDelta::Remove => meme.likes.saturating_sub(1),
        };
    }

    /// Appends `comment` to the catalog meme `meme_id`.
    ///
    /// Returns `Ok(false)` without persisting if no catalog meme matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the comment map cannot be persisted; the comment
    /// has already been appended in memory.
    #[instrument(skip(self, comment), fields(meme.id = %meme_id))]
    pub fn add_comment(&mut self, meme_id: &MemeId, comment: Comment) -> Result<bool> {
        let Some(meme) = self.catalog.iter_mut().find(|meme| &meme.id == meme_id) else {
            tracing::debug!("No catalog meme to comment on");
            return Ok(false);
        };

        meme.comments.push(comment.clone());
        self.comments
            .entry(meme_id.clone())
            .or_default()
            .push(comment);
        metrics::counter!("memeboard_comments_added_total").increment(1);

        self.persist(Slice::Comments)?;
        Ok(true)
    }

    /// Appends an uploaded meme to the user's collection.
    ///
    /// The catalog, trending subset and results are not touched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if an upload with the same ID exists,
    /// or an error if the uploads cannot be persisted.
    #[instrument(skip(self, meme), fields(meme.id = %meme.id))]
    pub fn add_user_meme(&mut self, meme: Meme) -> Result<()> {
        if self.user_memes.iter().any(|existing| existing.id == meme.id) {
            return Err(Error::InvalidInput(format!(
                "an upload with id {} already exists",
                meme.id
            )));
        }
        self.user_memes.push(meme);
        metrics::counter!("memeboard_uploads_total").increment(1);

        self.persist(Slice::UserMemes)
    }

    // ------------------------------------------------------------------
    // Hydration
    // ------------------------------------------------------------------

    /// Replaces the liked set with the stored one.
    ///
    /// Like counts in the catalog follow the change: dropped ids lose their
    /// +1 and new ids gain it.
    pub fn load_liked_memes(&mut self) -> Hydration {
        let (stored, outcome) = hydrate_slice::<BTreeSet<MemeId>, _>(&self.storage, Slice::LikedIds.key());
        let stored = stored.unwrap_or_default();

        let dropped: Vec<MemeId> = self.liked.difference(&stored).cloned().collect();
        let added: Vec<MemeId> = stored.difference(&self.liked).cloned().collect();
        for id in &dropped {
            self.adjust_likes(id, LikeDelta::Remove);
        }
        for id in &added {
            self.adjust_likes(id, LikeDelta::Add);
        }
        self.liked = stored;
        outcome
    }

    /// Replaces the uploads with the stored ones.
    pub fn load_user_memes(&mut self) -> Hydration {
        let (stored, outcome) = hydrate_slice::<Vec<Meme>, _>(&self.storage, Slice::UserMemes.key());
        self.user_memes = stored.unwrap_or_default();
        outcome
    }

    /// Replaces the comment map with the stored one and re-attaches it to
    /// the catalog.
    pub fn load_comments(&mut self) -> Hydration {
        let (stored, outcome) = hydrate_slice::<BTreeMap<MemeId, Vec<Comment>>, _>(
            &self.storage,
            Slice::Comments.key(),
        );
        let mut stored = stored.unwrap_or_default();
        stored.retain(|_, comments| !comments.is_empty());

        for meme in &mut self.catalog {
            meme.comments = stored.get(&meme.id).cloned().unwrap_or_default();
        }
        self.comments = stored;
        outcome
    }

    // ------------------------------------------------------------------
    // Persistence boundary
    // ------------------------------------------------------------------

    /// Writes one slice to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn persist(&self, slice: Slice) -> Result<()> {
        let result = match slice {
            Slice::LikedIds => write_slice(&self.storage, slice.key(), &self.liked),
            Slice::UserMemes => write_slice(&self.storage, slice.key(), &self.user_memes),
            Slice::Comments => {
                let non_empty: BTreeMap<&MemeId, &Vec<Comment>> = self
                    .comments
                    .iter()
                    .filter(|(_, comments)| !comments.is_empty())
                    .collect();
                write_slice(&self.storage, slice.key(), &non_empty)
            },
        };

        if let Err(ref e) = result {
            tracing::error!(key = slice.key(), error = %e, "Failed to persist slice");
        }
        result
    }

    // ------------------------------------------------------------------
    // Read model
    // ------------------------------------------------------------------

    /// Returns the full catalog in upstream order.
    pub fn catalog(&self) -> &[Meme] {
        &self.catalog
    }

    /// Returns the trending subset, most liked first.
    pub fn trending(&self) -> Vec<&Meme> {
        self.trending.iter().map(|&idx| &self.catalog[idx]).collect()
    }

    /// Returns the current search/filter/sort results.
    pub fn search_results(&self) -> Vec<&Meme> {
        self.results.iter().map(|&idx| &self.catalog[idx]).collect()
    }

    /// Returns the local user's uploads.
    pub fn user_memes(&self) -> &[Meme] {
        &self.user_memes
    }

    /// Returns the liked-id set.
    pub const fn liked_ids(&self) -> &BTreeSet<MemeId> {
        &self.liked
    }

    /// Returns true if `id` is liked.
    pub fn is_liked(&self, id: &MemeId) -> bool {
        self.liked.contains(id)
    }

    /// Returns liked catalog memes in catalog order.
    pub fn liked_memes(&self) -> Vec<&Meme> {
        self.catalog
            .iter()
            .filter(|meme| self.liked.contains(&meme.id))
            .collect()
    }

    /// Returns the fetch status.
    pub const fn status(&self) -> FetchStatus {
        self.status
    }

    /// Returns the last fetch error message.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the selected meme as it currently stands in the catalog.
    pub fn current_meme(&self) -> Option<&Meme> {
        let id = self.selected.as_ref()?;
        self.catalog.iter().find(|meme| &meme.id == id)
    }

    /// Finds a meme by ID in the catalog, then in the uploads.
    pub fn find(&self, id: &MemeId) -> Option<&Meme> {
        self.catalog
            .iter()
            .chain(self.user_memes.iter())
            .find(|meme| &meme.id == id)
    }

    /// Returns the storage backend.
    pub const fn storage(&self) -> &S {
        &self.storage
    }
}

/// Positions of the `limit` most liked memes, ties in catalog order.
fn top_by_likes(memes: &[Meme], limit: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..memes.len()).collect();
    order.sort_by(|&a, &b| memes[b].likes.cmp(&memes[a].likes));
    order.truncate(limit);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::storage::MemoryKeyValueStore;
    use chrono::{DateTime, TimeDelta};
    use std::sync::Arc;

    /// Enricher with scripted likes, categories and ages.
    struct ScriptedEnricher {
        script: Vec<(u32, Category, i64)>,
        next: usize,
    }

    impl Enricher for ScriptedEnricher {
        fn enrich(&mut self, raw: RawMeme, now: DateTime<Utc>) -> Meme {
            let (likes, category, age_days) = self.script[self.next % self.script.len()];
            self.next += 1;
            Meme {
                id: MemeId::new(raw.id),
                name: raw.name,
                url: raw.url,
                width: raw.width,
                height: raw.height,
                box_count: raw.box_count,
                captions: raw.captions,
                likes,
                comments: Vec::new(),
                date: Some(now - TimeDelta::days(age_days)),
                category: Some(category),
                user: None,
            }
        }
    }

    fn raw(id: &str, name: &str) -> RawMeme {
        RawMeme {
            id: id.to_string(),
            name: name.to_string(),
            url: format!("https://i.imgflip.com/{id}.jpg"),
            width: 500,
            height: 500,
            box_count: 2,
            captions: None,
        }
    }

    fn loaded_store(
        script: Vec<(u32, Category, i64)>,
        names: &[&str],
    ) -> (Arc<MemoryKeyValueStore>, MemeStore<Arc<MemoryKeyValueStore>>) {
        let storage = Arc::new(MemoryKeyValueStore::new());
        let mut store = MemeStore::new(Arc::clone(&storage))
            .with_enricher(ScriptedEnricher { script, next: 0 });
        let raws = names
            .iter()
            .enumerate()
            .map(|(i, name)| raw(&format!("m{}", i + 1), name))
            .collect();
        assert!(store.complete_fetch(Ok(raws)).is_ok());
        (storage, store)
    }

    #[test]
    fn test_complete_fetch_installs_views() {
        let (_, store) = loaded_store(
            vec![(5, Category::New, 1), (50, Category::Classic, 2), (20, Category::New, 3)],
            &["Drake", "Distracted Boyfriend", "Two Buttons"],
        );
        assert_eq!(store.status(), FetchStatus::Succeeded);
        assert_eq!(store.catalog().len(), 3);
        let trending: Vec<u32> = store.trending().iter().map(|m| m.likes).collect();
        assert_eq!(trending, vec![50, 20, 5]);
        let results: Vec<&str> = store.search_results().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(results, vec!["m1", "m2", "m3"]);
    }

    #[test]
    fn test_trending_is_capped_and_stable() {
        let script = vec![(10, Category::New, 1)];
        let names: Vec<String> = (0..15).map(|i| format!("Meme {i}")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let (_, store) = loaded_store(script, &names);
        let trending: Vec<&str> = store.trending().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(trending.len(), 10);
        assert_eq!(trending[0], "m1");
        assert_eq!(trending[9], "m10");
    }

    #[test]
    fn test_failed_fetch_records_error() {
        let mut store = MemeStore::new(MemoryKeyValueStore::new());
        assert!(store.should_fetch());
        store.begin_fetch();
        assert_eq!(store.status(), FetchStatus::Loading);
        assert!(!store.should_fetch());

        let result = store.complete_fetch(Err(Error::Fetch("Failed to fetch memes".into())));
        assert!(matches!(result, Err(Error::Fetch(_))));
        assert_eq!(store.status(), FetchStatus::Failed);
        assert_eq!(store.error(), Some("Failed to fetch memes"));
        assert!(store.catalog().is_empty());
    }

    #[test]
    fn test_duplicate_catalog_ids_are_dropped() {
        let mut store = MemeStore::new(MemoryKeyValueStore::new());
        let result = store.complete_fetch(Ok(vec![raw("1", "a"), raw("1", "b"), raw("2", "c")]));
        assert!(result.is_ok());
        let names: Vec<&str> = store.catalog().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_filter_by_category_and_all_sentinel() {
        let (_, mut store) = loaded_store(
            vec![(1, Category::New, 1), (2, Category::Classic, 1), (3, Category::New, 1)],
            &["a", "b", "c"],
        );
        store.filter_by_category(CategoryFilter::Only(Category::New));
        let ids: Vec<&str> = store.search_results().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m3"]);

        store.filter_by_category(CategoryFilter::All);
        let ids: Vec<&str> = store.search_results().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m3"]);
    }

    #[test]
    fn test_sort_by_date_puts_undated_last() {
        let (_, mut store) = loaded_store(
            vec![(1, Category::New, 30), (2, Category::New, 1), (3, Category::New, 10)],
            &["old", "fresh", "mid"],
        );
        store.catalog[0].date = None;
        store.sort_results(SortKey::Date);
        let names: Vec<&str> = store.search_results().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["fresh", "mid", "old"]);
    }

    #[test]
    fn test_select_meme_only_sees_catalog() {
        let (_, mut store) = loaded_store(vec![(1, Category::New, 1)], &["a"]);
        let upload = Meme {
            id: MemeId::new("upload-1"),
            ..store.catalog()[0].clone()
        };
        assert!(store.add_user_meme(upload).is_ok());

        assert!(store.select_meme(&MemeId::new("m1")));
        assert_eq!(store.current_meme().map(|m| m.name.as_str()), Some("a"));
        assert!(!store.select_meme(&MemeId::new("upload-1")));
        assert!(store.current_meme().is_none());
        assert!(store.find(&MemeId::new("upload-1")).is_some());
    }

    #[test]
    fn test_unlike_clamps_at_zero() {
        let (_, mut store) = loaded_store(vec![(0, Category::New, 1)], &["a"]);
        let id = MemeId::new("m1");
        store.liked.insert(id.clone());
        assert!(matches!(store.toggle_like(&id), Ok(false)));
        assert_eq!(store.catalog()[0].likes, 0);
    }

    #[test]
    fn test_like_on_zero_count_meme_increments() {
        let (_, mut store) = loaded_store(vec![(0, Category::New, 1)], &["a"]);
        assert!(matches!(store.toggle_like(&MemeId::new("m1")), Ok(true)));
        assert_eq!(store.catalog()[0].likes, 1);
    }

    #[test]
    fn test_toggle_like_unknown_id_still_toggles() {
        let (storage, mut store) = loaded_store(vec![(3, Category::New, 1)], &["a"]);
        let ghost = MemeId::new("ghost");
        assert!(matches!(store.toggle_like(&ghost), Ok(true)));
        assert!(store.is_liked(&ghost));
        assert_eq!(store.catalog()[0].likes, 3);
        assert_eq!(
            storage.get(keys::LIKED_MEMES).ok().flatten().as_deref(),
            Some(r#"["ghost"]"#)
        );
    }

    #[test]
    fn test_add_comment_unknown_meme_is_noop() {
        let (storage, mut store) = loaded_store(vec![(1, Category::New, 1)], &["a"]);
        let Ok(comment) = Comment::new("lol", "Meme Lover") else {
            panic!("comment should build");
        };
        assert!(matches!(store.add_comment(&MemeId::new("nope"), comment), Ok(false)));
        assert!(matches!(storage.get(keys::MEME_COMMENTS), Ok(None)));
    }

    #[test]
    fn test_comment_shows_on_selected_meme() {
        let (_, mut store) = loaded_store(vec![(1, Category::New, 1)], &["a"]);
        let id = MemeId::new("m1");
        store.select_meme(&id);
        let Ok(comment) = Comment::new("nice", "Meme Lover") else {
            panic!("comment should build");
        };
        assert!(matches!(store.add_comment(&id, comment), Ok(true)));
        assert_eq!(store.current_meme().map(|m| m.comments.len()), Some(1));
    }

    #[test]
    fn test_refetch_reapplies_likes_and_comments() {
        let (storage, mut store) = loaded_store(vec![(7, Category::New, 1)], &["a", "b"]);
        let id = MemeId::new("m2");
        assert!(store.toggle_like(&id).is_ok());
        let Ok(comment) = Comment::new("again", "Meme Lover") else {
            panic!("comment should build");
        };
        assert!(store.add_comment(&id, comment).is_ok());

        let mut fresh = MemeStore::new(Arc::clone(&storage)).with_enricher(ScriptedEnricher {
            script: vec![(7, Category::New, 1)],
            next: 0,
        });
        assert!(fresh.load_liked_memes().is_restored());
        assert!(fresh.load_comments().is_restored());
        assert!(fresh.complete_fetch(Ok(vec![raw("m1", "a"), raw("m2", "b")])).is_ok());

        assert_eq!(fresh.catalog()[0].likes, 7);
        assert_eq!(fresh.catalog()[1].likes, 8);
        assert_eq!(fresh.catalog()[1].comments.len(), 1);
        assert_eq!(fresh.liked_memes().len(), 1);
    }

    #[test]
    fn test_load_liked_after_fetch_reconciles_counts() {
        let storage = Arc::new(MemoryKeyValueStore::with_entries([(
            keys::LIKED_MEMES,
            r#"["m1"]"#,
        )]));
        let mut store = MemeStore::new(Arc::clone(&storage)).with_enricher(ScriptedEnricher {
            script: vec![(4, Category::New, 1)],
            next: 0,
        });
        assert!(store.complete_fetch(Ok(vec![raw("m1", "a"), raw("m2", "b")])).is_ok());
        assert!(store.toggle_like(&MemeId::new("m2")).is_ok());
        assert_eq!(store.catalog()[1].likes, 5);

        // Replace the stored set underneath the store
        assert!(storage.set(keys::LIKED_MEMES, r#"["m1"]"#).is_ok());
        assert!(store.load_liked_memes().is_restored());
        assert_eq!(store.catalog()[0].likes, 5);
        assert_eq!(store.catalog()[1].likes, 4);
    }

    #[test]
    fn test_duplicate_upload_is_rejected() {
        let (_, mut store) = loaded_store(vec![(1, Category::New, 1)], &["a"]);
        let meme = store.catalog()[0].clone();
        assert!(store.add_user_meme(meme.clone()).is_ok());
        assert!(matches!(store.add_user_meme(meme), Err(Error::InvalidInput(_))));
        assert_eq!(store.user_memes().len(), 1);
    }
}
