//! # Sync Configuration
//!
//! Configuration management for the sync coordinator.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BAZAAR_DB_PATH=/tmp/cache.db                                       │
//! │     BAZAAR_SYNC_COLLECTIONS=products,categories,users                  │
//! │     BAZAAR_DB_MAX_CONNECTIONS=2                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/app/sync.toml (Linux)                                    │
//! │     ~/Library/Application Support/com.bazaar.app/sync.toml (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     products + categories, platform data dir cache                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # sync.toml
//! [cache]
//! path = "/path/to/bazaar-cache.db"
//! max_connections = 4
//!
//! [sync]
//! collections = ["products", "categories"]
//! event_buffer = 8
//!
//! [notices]
//! stream_failed = "Couldn't refresh. Showing saved data."
//! refresh_failed = "Refresh failed. Showing saved data."
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use bazaar_core::Collection;
use bazaar_db::DbConfig;

use crate::error::{SyncError, SyncResult};

/// File name of the cache database inside the platform data dir.
pub const DATABASE_FILE: &str = "bazaar-cache.db";

/// File name of the config inside the platform config dir.
pub const CONFIG_FILE: &str = "sync.toml";

// =============================================================================
// Cache Settings
// =============================================================================

/// Where and how the local cache is opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Database file. `None` selects `<data dir>/bazaar-cache.db`.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Pool size.
    /// Default: 4
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    4
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

// =============================================================================
// Sync Settings
// =============================================================================

/// Which collections are mirrored, and event bus sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Collections that get a worker and take part in manual sync, in order.
    #[serde(default = "default_collections")]
    pub collections: Vec<Collection>,

    /// Broadcast capacity for failure events.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_collections() -> Vec<Collection> {
    vec![Collection::Products, Collection::Categories]
}

fn default_event_buffer() -> usize {
    8
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            collections: default_collections(),
            event_buffer: default_event_buffer(),
        }
    }
}

// =============================================================================
// Notices
// =============================================================================

/// Display copy carried by failure events.
///
/// Raw error text stays in the logs; users only see these strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notices {
    /// Shown when a live listener fails.
    #[serde(default = "default_stream_failed")]
    pub stream_failed: String,

    /// Shown when a pull-to-refresh fails.
    #[serde(default = "default_refresh_failed")]
    pub refresh_failed: String,
}

fn default_stream_failed() -> String {
    "Couldn't refresh. Showing saved data.".to_string()
}

fn default_refresh_failed() -> String {
    "Refresh failed. Showing saved data.".to_string()
}

impl Default for Notices {
    fn default() -> Self {
        Notices {
            stream_failed: default_stream_failed(),
            refresh_failed: default_refresh_failed(),
        }
    }
}

// =============================================================================
// Main Sync Configuration
// =============================================================================

/// Complete sync configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Local cache settings.
    #[serde(default)]
    pub cache: CacheSettings,

    /// Collection and event settings.
    #[serde(default)]
    pub sync: SyncSettings,

    /// User-facing failure copy.
    #[serde(default)]
    pub notices: Notices,
}

impl SyncConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (sync.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading sync config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load sync config, using defaults");
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Sync config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.sync.collections.is_empty() {
            return Err(SyncError::InvalidConfig(
                "at least one collection must be synced".into(),
            ));
        }

        let mut seen = HashSet::new();
        for collection in &self.sync.collections {
            if !seen.insert(collection) {
                return Err(SyncError::InvalidConfig(format!(
                    "collection '{}' is listed twice",
                    collection
                )));
            }
        }

        if self.sync.event_buffer == 0 {
            return Err(SyncError::InvalidConfig(
                "event_buffer must be greater than 0".into(),
            ));
        }

        if self.cache.max_connections == 0 {
            return Err(SyncError::InvalidConfig(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.notices.stream_failed.trim().is_empty()
            || self.notices.refresh_failed.trim().is_empty()
        {
            return Err(SyncError::InvalidConfig("notices must not be empty".into()));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Database path
        if let Some(path) = var("BAZAAR_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.cache.path = Some(PathBuf::from(path));
        }

        // Pool size
        if let Some(max) = var("BAZAAR_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(m) => self.cache.max_connections = m,
                Err(_) => warn!(value = %max, "Ignoring invalid BAZAAR_DB_MAX_CONNECTIONS"),
            }
        }

        // Collections
        if let Some(list) = var("BAZAAR_SYNC_COLLECTIONS") {
            let parsed: Result<Vec<Collection>, _> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse::<Collection>)
                .collect();

            match parsed {
                Ok(collections) => {
                    debug!(?collections, "Overriding synced collections from environment");
                    self.sync.collections = collections;
                }
                Err(e) => warn!(value = %list, error = %e, "Ignoring invalid BAZAAR_SYNC_COLLECTIONS"),
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "bazaar", "app")
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Returns the default cache database path.
    pub fn default_database_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().join(DATABASE_FILE))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Resolved cache database path.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.cache.path.clone().or_else(Self::default_database_path)
    }

    /// Builds the [`DbConfig`] for opening the cache.
    pub fn db_config(&self) -> SyncResult<DbConfig> {
        let path = self
            .database_path()
            .ok_or_else(|| SyncError::InvalidConfig("No database path available".into()))?;

        Ok(DbConfig::new(path).max_connections(self.cache.max_connections))
    }

    /// Collections in sync order.
    pub fn collections(&self) -> &[Collection] {
        &self.sync.collections
    }
}
