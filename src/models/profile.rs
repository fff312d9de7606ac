//! Local user profile.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Placeholder display name used until a profile is saved.
pub const DEFAULT_NAME: &str = "Meme Lover";

/// Placeholder bio used until a profile is saved.
pub const DEFAULT_BIO: &str = "I love creating and sharing memes!";

/// Placeholder picture reference used until a profile is saved.
pub const DEFAULT_PICTURE: &str = "/placeholder.svg?height=200&width=200";

/// The single local user profile.
///
/// This is a local identity, not an authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Display name.
    pub name: String,
    /// Free-text bio.
    pub bio: String,
    /// Picture reference (URL or `data:` URL).
    pub profile_picture: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            bio: DEFAULT_BIO.to_string(),
            profile_picture: DEFAULT_PICTURE.to_string(),
        }
    }
}

impl UserProfile {
    /// Returns a copy with `update` merged in; unset fields keep their value.
    #[must_use]
    pub fn merged(&self, update: ProfileUpdate) -> Self {
        Self {
            name: update.name.unwrap_or_else(|| self.name.clone()),
            bio: update.bio.unwrap_or_else(|| self.bio.clone()),
            profile_picture: update
                .profile_picture
                .unwrap_or_else(|| self.profile_picture.clone()),
        }
    }
}

/// Partial profile update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New bio.
    pub bio: Option<String>,
    /// New picture reference.
    pub profile_picture: Option<String>,
}

impl ProfileUpdate {
    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the bio.
    #[must_use]
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    /// Sets the picture reference.
    #[must_use]
    pub fn with_profile_picture(mut self, picture: impl Into<String>) -> Self {
        self.profile_picture = Some(picture.into());
        self
    }

    /// Returns true if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.bio.is_none() && self.profile_picture.is_none()
    }

    /// Rejects a blank display name before the update reaches the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `name` is set but blank.
    pub fn validated(self) -> Result<Self> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(Error::Validation("Please enter a display name.".to_string()));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_unset_fields() {
        let profile = UserProfile::default();
        let merged = profile.merged(ProfileUpdate::default().with_bio("new bio"));
        assert_eq!(merged.name, DEFAULT_NAME);
        assert_eq!(merged.bio, "new bio");
        assert_eq!(merged.profile_picture, DEFAULT_PICTURE);
    }

    #[test]
    fn test_validated_rejects_blank_name() {
        let update = ProfileUpdate::default().with_name("  ");
        assert!(matches!(update.validated(), Err(Error::Validation(_))));
        assert!(ProfileUpdate::default().with_bio("").validated().is_ok());
    }

    #[test]
    fn test_serializes_with_browser_field_names() {
        let json = serde_json::to_string(&UserProfile::default()).unwrap_or_default();
        assert!(json.contains("\"profilePicture\""));
    }
}
