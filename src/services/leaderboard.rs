//! Leaderboard over the catalog and the local uploads.

use crate::models::Meme;
use std::collections::HashMap;

/// Default number of entries per leaderboard table.
pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

/// Summed likes for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserScore {
    /// User display name.
    pub user: String,
    /// Total likes over the user's memes.
    pub likes: u64,
    /// Number of memes counted.
    pub memes: usize,
}

/// Top memes and top users by likes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard<'a> {
    /// Most liked memes, ties in input order.
    pub top_memes: Vec<&'a Meme>,
    /// Users with the most total likes, ties by name.
    pub top_users: Vec<UserScore>,
}

impl<'a> Leaderboard<'a> {
    /// Builds both tables from `memes`, keeping `limit` entries each.
    pub fn build<I>(memes: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = &'a Meme>,
        I::IntoIter: Clone,
    {
        let memes = memes.into_iter();
        Self {
            top_memes: top_memes(memes.clone(), limit),
            top_users: top_users(memes, limit),
        }
    }
}

/// Returns the `limit` most liked memes. The sort is stable.
pub fn top_memes<'a>(memes: impl IntoIterator<Item = &'a Meme>, limit: usize) -> Vec<&'a Meme> {
    let mut ranked: Vec<&Meme> = memes.into_iter().collect();
    ranked.sort_by(|a, b| b.likes.cmp(&a.likes));
    ranked.truncate(limit);
    ranked
}

/// Returns the `limit` users with the most summed likes.
///
/// Memes without an owning user are skipped.
pub fn top_users<'a>(memes: impl IntoIterator<Item = &'a Meme>, limit: usize) -> Vec<UserScore> {
    let mut totals: HashMap<&str, (u64, usize)> = HashMap::new();
    for meme in memes {
        let Some(user) = meme.user.as_deref() else {
            continue;
        };
        let entry = totals.entry(user).or_default();
        entry.0 += u64::from(meme.likes);
        entry.1 += 1;
    }

    let mut scores: Vec<UserScore> = totals
        .into_iter()
        .map(|(user, (likes, memes))| UserScore {
            user: user.to_string(),
            likes,
            memes,
        })
        .collect();
    scores.sort_by(|a, b| b.likes.cmp(&a.likes).then_with(|| a.user.cmp(&b.user)));
    scores.truncate(limit);
    scores
}
