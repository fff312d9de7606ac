//! Configuration management.
//!
//! Values resolve in order: defaults, then the TOML config file, then
//! `MEMEBOARD_*` environment variables, then CLI flags.

use crate::models::DEFAULT_PAGE_SIZE;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default catalog endpoint.
pub const DEFAULT_CATALOG_URL: &str = "https://api.imgflip.com/get_memes";

/// Default size of the trending subset.
pub const DEFAULT_TRENDING_LIMIT: usize = 10;

/// Main configuration for memeboard.
#[derive(Debug, Clone)]
pub struct MemeboardConfig {
    /// Directory holding persisted state.
    pub data_dir: PathBuf,
    /// Storage backend.
    pub backend: StorageBackendType,
    /// Catalog endpoint.
    pub catalog_url: String,
    /// Memes per explore page.
    pub page_size: usize,
    /// Size of the trending subset.
    pub trending_limit: usize,
    /// Logging settings.
    pub logging: LoggingSettings,
    warnings: Vec<String>,
}

/// Available storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackendType {
    /// One JSON file per key in the data directory.
    #[default]
    Filesystem,
    /// A single `SQLite` database in the data directory.
    Sqlite,
    /// Volatile in-process storage.
    Memory,
}

impl StorageBackendType {
    /// Returns the backend name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Filesystem => "filesystem",
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }

    /// Parses a backend name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for unknown names.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "filesystem" | "fs" | "file" => Ok(Self::Filesystem),
            "sqlite" => Ok(Self::Sqlite),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(Error::InvalidInput(format!(
                "unknown storage backend: {other}"
            ))),
        }
    }
}

/// Logging settings from the config file or environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSettings {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Log file path; logs go to stderr when unset.
    pub file: Option<PathBuf>,
    /// `EnvFilter` directive, e.g. `memeboard=debug`.
    pub filter: Option<String>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Data directory.
    pub data_dir: Option<String>,
    /// Storage backend name.
    pub backend: Option<String>,
    /// Catalog endpoint.
    pub catalog_url: Option<String>,
    /// Memes per page.
    pub page_size: Option<usize>,
    /// Trending subset size.
    pub trending_limit: Option<usize>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
}

impl Default for MemeboardConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: StorageBackendType::default(),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            trending_limit: DEFAULT_TRENDING_LIMIT,
            logging: LoggingSettings::default(),
            warnings: Vec::new(),
        }
    }
}

/// Returns the platform data directory, or `.memeboard` if none exists.
fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "memeboard").map_or_else(
        || PathBuf::from(".memeboard"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

impl MemeboardConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or names an unknown
    /// backend.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Looks for `config.toml` in the platform config dir, then in
    /// `~/.config/memeboard/`. Returns defaults if neither parses; skipped
    /// files are listed in [`Self::warnings`].
    #[must_use]
    pub fn load_default() -> Self {
        let mut skipped = Vec::new();
        let candidates = [
            directories::ProjectDirs::from("", "", "memeboard")
                .map(|dirs| dirs.config_dir().join("config.toml")),
            directories::BaseDirs::new().map(|base| {
                base.home_dir()
                    .join(".config")
                    .join("memeboard")
                    .join("config.toml")
            }),
        ];

        for path in candidates.into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(mut config) => {
                    config.warnings = skipped;
                    return config;
                },
                Err(e) => skipped.push(format!("ignoring config file {}: {e}", path.display())),
            }
        }

        Self {
            warnings: skipped,
            ..Self::default()
        }
    }

    /// Converts a `ConfigFile` to `MemeboardConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(data_dir) = file.data_dir {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(backend) = file.backend {
            config.backend = StorageBackendType::parse(&backend)?;
        }
        if let Some(url) = file.catalog_url {
            config.catalog_url = url;
        }
        if let Some(page_size) = file.page_size {
            config.page_size = page_size.max(1);
        }
        if let Some(limit) = file.trending_limit {
            config.trending_limit = limit;
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        Ok(config)
    }

    /// Applies `MEMEBOARD_*` overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Applies `MEMEBOARD_*` overrides using `lookup` to read variables.
    ///
    /// Invalid values are ignored and recorded in [`Self::warnings`].
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup("MEMEBOARD_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(backend) = lookup("MEMEBOARD_BACKEND") {
            match StorageBackendType::parse(&backend) {
                Ok(parsed) => self.backend = parsed,
                Err(e) => self.warnings.push(format!("ignoring MEMEBOARD_BACKEND: {e}")),
            }
        }
        if let Some(url) = lookup("MEMEBOARD_CATALOG_URL") {
            self.catalog_url = url;
        }
        if let Some(size) = lookup("MEMEBOARD_PAGE_SIZE") {
            match size.parse::<usize>() {
                Ok(parsed) => self.page_size = parsed.max(1),
                Err(e) => self
                    .warnings
                    .push(format!("ignoring MEMEBOARD_PAGE_SIZE={size}: {e}")),
            }
        }
        if let Some(format) = lookup("MEMEBOARD_LOG_FORMAT") {
            self.logging.format = Some(format);
        }
        if let Some(file) = lookup("MEMEBOARD_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }
        self
    }

    /// Sets the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    /// Sets the storage backend.
    #[must_use]
    pub const fn with_backend(mut self, backend: StorageBackendType) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the catalog endpoint.
    #[must_use]
    pub fn with_catalog_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_url = url.into();
        self
    }

    /// Returns the problems found while loading, for the caller to report
    /// once logging is up.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
