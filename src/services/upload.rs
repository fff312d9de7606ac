//! Upload helpers.
//!
//! Validation here runs before any store operation; the stores accept
//! whatever they are given.
// Allow expect() on the static title regex - it is guaranteed to compile
#![allow(clippy::expect_used)]

use crate::models::{Category, Meme, MemeId};
use crate::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use rand::Rng;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Largest accepted meme image.
pub const MAX_MEME_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Largest accepted profile picture.
pub const MAX_PROFILE_PICTURE_BYTES: u64 = 2 * 1024 * 1024;

/// Dimensions recorded for uploaded memes.
const UPLOAD_DIMENSION: u32 = 500;

/// Template regions recorded for uploaded memes.
const UPLOAD_BOX_COUNT: u32 = 2;

/// Canned captions offered by [`suggest_caption`].
pub const SAMPLE_CAPTIONS: [&str; 6] = [
    "When you finally find the bug in your code after 5 hours",
    "That moment when you realize it's only Tuesday",
    "Me explaining to my mom why I need a new gaming PC",
    "When someone says they'll be ready in 5 minutes",
    "How I look waiting for my code to compile",
    "My face when the internet goes down for 5 minutes",
];

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w\S*").expect("static regex: title word"));

/// An image read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// File name including extension.
    pub file_name: String,
    /// MIME type guessed from the extension.
    pub mime_type: String,
    /// Raw bytes.
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Wraps in-memory image data.
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads and validates an image file.
    ///
    /// The size is checked before the file is read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the file is not an image or is larger
    /// than `max_bytes`, or [`Error::OperationFailed`] if it cannot be read.
    pub fn from_path(path: &Path, max_bytes: u64) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = mime_from_extension(path).unwrap_or("application/octet-stream");

        let metadata = std::fs::metadata(path).map_err(|e| Error::OperationFailed {
            operation: "read_image".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        check_image(mime_type, metadata.len(), max_bytes)?;

        let bytes = std::fs::read(path).map_err(|e| Error::OperationFailed {
            operation: "read_image".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        Ok(Self::new(file_name, mime_type, bytes))
    }

    /// Returns the image size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Encodes the image as a base64 `data:` URL.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

/// Guesses an image MIME type from a file extension.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Checks that `file` is an image no larger than `max_bytes`.
///
/// # Errors
///
/// Returns [`Error::Validation`] with a user-facing message.
pub fn validate_image(file: &ImageFile, max_bytes: u64) -> Result<()> {
    check_image(&file.mime_type, file.size(), max_bytes)
}

fn check_image(mime_type: &str, size: u64, max_bytes: u64) -> Result<()> {
    if !mime_type.starts_with("image/") {
        return Err(Error::Validation(
            "Please upload an image file (JPEG, PNG, GIF).".to_string(),
        ));
    }
    if size > max_bytes {
        return Err(Error::Validation(format!(
            "Please upload an image smaller than {}MB.",
            max_bytes / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Derives a display title from a file name.
///
/// `funny_cat-pic.final.png` becomes `Funny Cat Pic`.
pub fn title_from_file_name(file_name: &str) -> String {
    let stem = file_name.split('.').next().unwrap_or_default();
    let spaced = stem.replace(['-', '_'], " ");
    WORD.replace_all(&spaced, |caps: &regex::Captures<'_>| title_case(&caps[0]))
        .into_owned()
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

/// Picks one of [`SAMPLE_CAPTIONS`].
pub fn suggest_caption<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    SAMPLE_CAPTIONS[rng.random_range(0..SAMPLE_CAPTIONS.len())]
}

/// A user upload awaiting conversion into a [`Meme`].
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Display title.
    pub title: String,
    /// Optional caption.
    pub caption: Option<String>,
    /// The image.
    pub image: ImageFile,
}

impl UploadRequest {
    /// Creates a request; an empty title is derived from the file name.
    pub fn new(title: Option<String>, caption: Option<String>, image: ImageFile) -> Self {
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| title_from_file_name(&image.file_name));
        Self {
            title,
            caption: caption.filter(|c| !c.trim().is_empty()),
            image,
        }
    }

    /// Validates the request and builds the meme owned by `user`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the title is blank, or the image is
    /// not an image or exceeds [`MAX_MEME_IMAGE_BYTES`].
    pub fn into_meme(self, user: &str, now: DateTime<Utc>) -> Result<Meme> {
        if self.title.trim().is_empty() || self.image.bytes.is_empty() {
            return Err(Error::Validation(
                "Please provide a title and upload an image.".to_string(),
            ));
        }
        validate_image(&self.image, MAX_MEME_IMAGE_BYTES)?;

        Ok(Meme {
            id: MemeId::generate(),
            name: self.title,
            url: self.image.data_url(),
            width: UPLOAD_DIMENSION,
            height: UPLOAD_DIMENSION,
            box_count: UPLOAD_BOX_COUNT,
            captions: Some(u32::from(self.caption.is_some())),
            likes: 0,
            comments: Vec::new(),
            date: Some(now),
            category: Some(Category::New),
            user: Some(user.to_string()),
        })
    }
}

/// Reads a profile picture and returns it as a `data:` URL.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the file is not an image or exceeds
/// [`MAX_PROFILE_PICTURE_BYTES`].
pub fn profile_picture_from_file(path: &Path) -> Result<String> {
    ImageFile::from_path(path, MAX_PROFILE_PICTURE_BYTES).map(|image| image.data_url())
}
