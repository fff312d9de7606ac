//! Meme and comment types and identifiers.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Unique identifier for a meme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemeId(String);

impl MemeId {
    /// Creates a new meme ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random ID (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MemeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MemeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Meme category assigned during catalog enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Currently popular.
    Trending,
    /// Recently added.
    New,
    /// Long-standing favourites.
    Classic,
    /// Everything else.
    Random,
}

impl Category {
    /// Returns all categories in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Trending, Self::New, Self::Classic, Self::Random]
    }

    /// Returns the category label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trending => "Trending",
            Self::New => "New",
            Self::Classic => "Classic",
            Self::Random => "Random",
        }
    }

    /// Parses a category label (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trending" => Some(Self::Trending),
            "new" => Some(Self::New),
            "classic" => Some(Self::Classic),
            "random" => Some(Self::Random),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category filter with the `All` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Leaves the current result set untouched.
    #[default]
    All,
    /// Restricts results to one category.
    Only(Category),
}

impl CategoryFilter {
    /// Parses a filter label; `"All"` selects the sentinel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for unknown labels.
    pub fn parse(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Category::parse(s)
            .map(Self::Only)
            .ok_or_else(|| Error::InvalidInput(format!("unknown category: {s}")))
    }
}

/// Sort key for the search result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Like count, highest first.
    #[default]
    Likes,
    /// Date, most recent first.
    Date,
}

impl SortKey {
    /// Returns the key as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Likes => "likes",
            Self::Date => "date",
        }
    }

    /// Parses a sort key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for anything other than `likes` or `date`.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "likes" => Ok(Self::Likes),
            "date" => Ok(Self::Date),
            _ => Err(Error::InvalidInput(format!("unknown sort key: {s}"))),
        }
    }
}

/// A comment on a meme.
///
/// Comments are immutable once created and are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier.
    pub id: String,
    /// Comment body.
    pub text: String,
    /// Author display name.
    pub user: String,
    /// Creation timestamp.
    pub date: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment authored now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `text` is blank.
    pub fn new(text: impl Into<String>, user: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::Validation("Comment cannot be empty".to_string()));
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            text,
            user: user.into(),
            date: Utc::now(),
        })
    }
}

/// A meme, either from the catalog or uploaded by the local user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meme {
    /// Unique identifier.
    pub id: MemeId,
    /// Display name.
    pub name: String,
    /// Image URL (remote or `data:` URL).
    pub url: String,
    /// Origin width in pixels.
    pub width: u32,
    /// Origin height in pixels.
    pub height: u32,
    /// Number of caption regions in the template.
    pub box_count: u32,
    /// Number of generated captions, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captions: Option<u32>,
    /// Like count; missing or null in stored data reads as 0.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub likes: u32,
    /// Comments in display order.
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Origin timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    /// Category label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Owning user name (uploads only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

fn null_as_zero<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!(Category::parse("classic"), Some(Category::Classic));
        assert_eq!(Category::parse("TRENDING"), Some(Category::Trending));
        assert_eq!(Category::parse("cats"), None);
    }

    #[test]
    fn test_category_filter_all_sentinel() {
        assert!(matches!(CategoryFilter::parse("All"), Ok(CategoryFilter::All)));
        assert!(matches!(
            CategoryFilter::parse("New"),
            Ok(CategoryFilter::Only(Category::New))
        ));
        assert!(CategoryFilter::parse("Spicy").is_err());
    }

    #[test]
    fn test_sort_key_parse() {
        assert!(matches!(SortKey::parse("likes"), Ok(SortKey::Likes)));
        assert!(matches!(SortKey::parse("Date"), Ok(SortKey::Date)));
        assert!(SortKey::parse("name").is_err());
    }

    #[test]
    fn test_comment_rejects_blank_text() {
        assert!(matches!(
            Comment::new("   ", "Meme Lover"),
            Err(Error::Validation(_))
        ));
        let comment = Comment::new("lol", "Meme Lover");
        assert!(comment.is_ok_and(|c| c.text == "lol" && c.user == "Meme Lover"));
    }

    #[test]
    fn test_meme_tolerates_missing_and_null_likes() {
        let json = r#"{"id":"1","name":"Drake","url":"u","width":1,"height":1,"box_count":2,"likes":null}"#;
        let meme: Meme = serde_json::from_str(json).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(meme.likes, 0);
        assert!(meme.comments.is_empty());

        let json = r#"{"id":"1","name":"Drake","url":"u","width":1,"height":1,"box_count":2}"#;
        let meme: Meme = serde_json::from_str(json).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(meme.likes, 0);
        assert_eq!(meme.category, None);
    }

    #[test]
    fn test_comment_reads_browser_iso_dates() {
        let json = r#"{"id":"c1","text":"lol","user":"Meme Lover","date":"2024-03-01T12:30:00.000Z"}"#;
        let comment: Comment = serde_json::from_str(json).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(comment.date.to_rfc3339(), "2024-03-01T12:30:00+00:00");
    }
}
