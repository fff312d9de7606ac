//! Data models for memeboard.
//!
//! This module contains the core data structures shared by the stores,
//! the persistence backends and the catalog fetcher.

mod meme;
mod page;
pub mod profile;
mod status;

pub use meme::{Category, CategoryFilter, Comment, Meme, MemeId, SortKey};
pub use page::{DEFAULT_PAGE_SIZE, Page, paginate};
pub use profile::{ProfileUpdate, UserProfile};
pub use status::FetchStatus;
