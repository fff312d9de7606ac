//! Catalog fetch status.

use std::fmt;

/// Lifecycle of the catalog fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    /// No fetch has been issued.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last fetch replaced the catalog.
    Succeeded,
    /// The last fetch failed; see the store's error message.
    Failed,
}

impl FetchStatus {
    /// Returns the status as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
