//! Catalog fetching and engagement enrichment.
//!
//! The upstream catalog only carries template metadata. [`Enricher`]
//! implementations fill in the engagement fields (likes, category, date)
//! before the memes enter the store.

mod imgflip;

pub use imgflip::{ImgflipFetcher, parse_catalog_response};

use crate::Result;
use crate::models::{Category, Meme, MemeId};
use chrono::{DateTime, TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Upper bound (exclusive) for simulated like counts.
pub const MAX_SIMULATED_LIKES: u32 = 1000;

/// Upper bound (exclusive) for how far back a catalog date is pushed, in
/// milliseconds (about 115 days).
pub const MAX_BACKDATE_MS: i64 = 10_000_000_000;

/// A catalog record as returned by the upstream service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMeme {
    /// Template ID.
    pub id: String,
    /// Template name.
    pub name: String,
    /// Image URL.
    pub url: String,
    /// Image width.
    pub width: u32,
    /// Image height.
    pub height: u32,
    /// Caption region count.
    pub box_count: u32,
    /// Caption count, when the service reports it.
    #[serde(default)]
    pub captions: Option<u32>,
}

/// One-shot source of the full meme catalog.
pub trait CatalogFetcher: Send + Sync {
    /// Fetches the catalog in upstream order.
    ///
    /// Any failure, including an unsuccessful response, is an
    /// [`Error::Fetch`](crate::Error::Fetch).
    fn fetch(&self) -> impl Future<Output = Result<Vec<RawMeme>>> + Send;
}

/// Fetcher returning a fixed catalog, for offline use and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    memes: Vec<RawMeme>,
}

impl StaticFetcher {
    /// Creates a fetcher that always returns `memes`.
    #[must_use]
    pub const fn new(memes: Vec<RawMeme>) -> Self {
        Self { memes }
    }
}

impl CatalogFetcher for StaticFetcher {
    async fn fetch(&self) -> Result<Vec<RawMeme>> {
        Ok(self.memes.clone())
    }
}

/// Assigns engagement metadata to raw catalog records.
pub trait Enricher: Send {
    /// Converts a raw record into a catalog meme.
    fn enrich(&mut self, raw: RawMeme, now: DateTime<Utc>) -> Meme;
}

/// Production enricher drawing uniform random engagement.
///
/// - likes in `[0, 999]`
/// - date backdated by up to [`MAX_BACKDATE_MS`]
/// - category uniform over [`Category::all`]
#[derive(Debug, Clone)]
pub struct RandomEnricher {
    rng: StdRng,
}

impl RandomEnricher {
    /// Creates an enricher seeded from the OS.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a reproducible enricher.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomEnricher {
    fn default() -> Self {
        Self::new()
    }
}

impl Enricher for RandomEnricher {
    fn enrich(&mut self, raw: RawMeme, now: DateTime<Utc>) -> Meme {
        let likes = self.rng.random_range(0..MAX_SIMULATED_LIKES);
        let backdate = TimeDelta::milliseconds(self.rng.random_range(0..MAX_BACKDATE_MS));
        let categories = Category::all();
        let category = categories[self.rng.random_range(0..categories.len())];

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
            date: Some(now - backdate),
            category: Some(category),
            user: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str) -> RawMeme {
        RawMeme {
            id: id.to_string(),
            name: format!("Meme {id}"),
            url: format!("https://i.imgflip.com/{id}.jpg"),
            width: 500,
            height: 400,
            box_count: 2,
            captions: None,
        }
    }

    #[test]
    fn test_random_enricher_stays_in_bounds() {
        let mut enricher = RandomEnricher::seeded(42);
        let now = Utc::now();
        for i in 0..200 {
            let meme = enricher.enrich(raw(&i.to_string()), now);
            assert!(meme.likes < MAX_SIMULATED_LIKES);
            assert!(meme.comments.is_empty());
            assert!(meme.category.is_some());
            let date = meme.date.unwrap_or(now);
            assert!(date <= now);
            assert!(now - date < TimeDelta::milliseconds(MAX_BACKDATE_MS));
        }
    }

    #[test]
    fn test_seeded_enricher_is_reproducible() {
        let now = Utc::now();
        let a = RandomEnricher::seeded(7).enrich(raw("1"), now);
        let b = RandomEnricher::seeded(7).enrich(raw("1"), now);
        assert_eq!(a, b);
    }

    #[test]
    fn test_enrich_keeps_template_fields() {
        let meme = RandomEnricher::seeded(1).enrich(raw("61579"), Utc::now());
        assert_eq!(meme.id.as_str(), "61579");
        assert_eq!(meme.name, "Meme 61579");
        assert_eq!((meme.width, meme.height, meme.box_count), (500, 400, 2));
        assert_eq!(meme.user, None);
    }

    #[tokio::test]
    async fn test_static_fetcher_returns_catalog() {
        let fetcher = StaticFetcher::new(vec![raw("1"), raw("2")]);
        let memes = fetcher.fetch().await.unwrap_or_default();
        assert_eq!(memes.len(), 2);
    }
}
