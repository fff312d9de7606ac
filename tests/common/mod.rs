//! Shared fixtures for integration tests.

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use chrono::{DateTime, TimeDelta, Utc};
use memeboard::models::Category;
use memeboard::storage::KeyValueStore;
use memeboard::{Enricher, Error, Meme, MemeId, MemeStore, RawMeme, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Enricher assigning scripted likes and categories, one day apart.
pub struct FixedEnricher {
    script: Vec<(u32, Category)>,
    next: usize,
}

impl FixedEnricher {
    pub fn new(script: Vec<(u32, Category)>) -> Self {
        Self { script, next: 0 }
    }

    pub fn likes(likes: &[u32]) -> Self {
        Self::new(likes.iter().map(|&l| (l, Category::New)).collect())
    }
}

impl Enricher for FixedEnricher {
    fn enrich(&mut self, raw: RawMeme, now: DateTime<Utc>) -> Meme {
        let (likes, category) = self.script[self.next % self.script.len()];
        let age = i64::try_from(self.next).unwrap_or(0);
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
            date: Some(now - TimeDelta::days(age)),
            category: Some(category),
            user: None,
        }
    }
}

pub fn raw(id: &str, name: &str) -> RawMeme {
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

/// Raw records `m1..=mN` named after `names`.
pub fn raws(names: &[&str]) -> Vec<RawMeme> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| raw(&format!("m{}", i + 1), name))
        .collect()
}

/// A store over `storage` with the catalog installed from `names`/`likes`.
pub fn store_with<S: KeyValueStore>(storage: S, names: &[&str], likes: &[u32]) -> MemeStore<S> {
    let mut store = MemeStore::new(storage).with_enricher(FixedEnricher::likes(likes));
    store.complete_fetch(Ok(raws(names))).unwrap();
    store
}

/// In-memory backend whose writes can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    values: Mutex<HashMap<String, String>>,
    failing: AtomicBool,
}

impl FlakyStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::OperationFailed {
                operation: "get".to_string(),
                cause: "backend offline".to_string(),
            });
        }
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::OperationFailed {
                operation: "set".to_string(),
                cause: "backend offline".to_string(),
            });
        }
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "flaky"
    }
}

pub fn shared_flaky() -> Arc<FlakyStore> {
    Arc::new(FlakyStore::default())
}
