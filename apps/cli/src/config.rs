//! # Shell Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command-line flags (`--db`)
//! 2. Environment variables (`SHELF_*`)
//! 3. Config file (`shelf.toml`)
//! 4. Defaults (this file)
//!
//! ## Config File
//! ```toml
//! [database]
//! path = "/srv/library/shelf.db"
//! max_connections = 4
//!
//! [logging]
//! filter = "info,shelf=debug,sqlx=warn"
//! ```
//!
//! The default file lives in the platform config directory:
//! - **macOS**: `~/Library/Application Support/com.shelf.library/shelf.toml`
//! - **Windows**: `%APPDATA%\shelf\library\config\shelf.toml`
//! - **Linux**: `~/.config/shelf-library/shelf.toml`
//!
//! A missing default file is not an error. A missing file passed with
//! `--config` is.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ShellError, ShellResult};
use shelf_db::{DbConfig, IN_MEMORY_PATH};

/// Environment variable overriding the database path.
pub const ENV_DB_PATH: &str = "SHELF_DB_PATH";

/// Environment variable overriding the pool size.
pub const ENV_MAX_CONNECTIONS: &str = "SHELF_MAX_CONNECTIONS";

/// Environment variable overriding the log filter.
pub const ENV_LOG: &str = "SHELF_LOG";

/// Log filter used when nothing else is configured.
pub const DEFAULT_LOG_FILTER: &str = "warn,shelf=info,sqlx=warn";

const CONFIG_FILE_NAME: &str = "shelf.toml";
const DB_FILE_NAME: &str = "shelf.db";

// =============================================================================
// Config Types
// =============================================================================

/// Shell configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShelfConfig {
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSettings {
    /// Database file. `None` means the platform data directory.
    /// `":memory:"` gives a throwaway database.
    pub path: Option<PathBuf>,

    /// Connection pool size.
    pub max_connections: u32,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directives.
    /// `RUST_LOG` still wins when set.
    pub filter: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: 4,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

impl ShelfConfig {
    /// Loads configuration from file and process environment.
    ///
    /// `explicit` is the `--config` flag; without it the platform default
    /// file is read if present.
    pub fn load(explicit: Option<&Path>) -> ShellResult<Self> {
        let mut config = match explicit {
            Some(path) if !path.exists() => {
                return Err(ShellError::ConfigNotFound(path.display().to_string()))
            }
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => ShelfConfig::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML config file.
    pub fn from_file(path: &Path) -> ShellResult<Self> {
        debug!(path = %path.display(), "Reading config file");
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text).map_err(|source| ShellError::ConfigParse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parses TOML config text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Applies `SHELF_*` overrides read through `lookup`.
    ///
    /// Taking the lookup as a function keeps tests off the process
    /// environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ShellResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB_PATH).filter(|p| !p.trim().is_empty()) {
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup(ENV_MAX_CONNECTIONS) {
            self.database.max_connections = raw.trim().parse().map_err(|_| {
                ShellError::InvalidConfig(format!(
                    "{} must be a positive integer, got '{}'",
                    ENV_MAX_CONNECTIONS, raw
                ))
            })?;
        }

        if let Some(filter) = lookup(ENV_LOG).filter(|f| !f.trim().is_empty()) {
            self.logging.filter = filter;
        }

        Ok(())
    }

    /// Sets the database path (the `--db` flag).
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database.path = Some(path.into());
        self
    }

    /// Checks that the values are usable.
    pub fn validate(&self) -> ShellResult<()> {
        if self.database.max_connections == 0 {
            return Err(ShellError::InvalidConfig(
                "database.max_connections must be at least 1".into(),
            ));
        }

        if let Some(path) = &self.database.path {
            if path.as_os_str().is_empty() {
                return Err(ShellError::InvalidConfig(
                    "database.path must not be empty".into(),
                ));
            }
        }

        Ok(())
    }

    /// Resolves the database file, creating the default data directory
    /// when it is used.
    pub fn database_path(&self) -> ShellResult<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let dirs = project_dirs().ok_or(ShellError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Ok(data_dir.join(DB_FILE_NAME))
    }

    /// Builds the store configuration.
    pub fn db_config(&self) -> ShellResult<DbConfig> {
        let path = self.database_path()?;
        let config = if path.as_os_str() == IN_MEMORY_PATH {
            DbConfig::in_memory()
        } else {
            DbConfig::new(path).max_connections(self.database.max_connections)
        };
        Ok(config)
    }

    /// Platform default config file location.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "shelf", "library")
}
