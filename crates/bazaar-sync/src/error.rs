//! # Sync Error Types
//!
//! Error types for sync operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Remote      │  │     Cache               │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Remote         │  │  DatabaseError          │ │
//! │  │  ConfigLoad...  │  │  ListenerClosed │  │                         │ │
//! │  │  ConfigSave...  │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these messages reach the UI. Users only ever see the pre-set
//! notice strings carried by [`SyncEvent`](crate::events::SyncEvent).

use thiserror::Error;

use bazaar_core::Collection;

use crate::remote::RemoteError;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering all possible sync failures.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// The remote backend refused or failed a request.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// The listener stopped delivering without reporting an error.
    ///
    /// ## When This Occurs
    /// - The backend dropped the callback (app backgrounded, client torn down)
    #[error("Listener for {collection} closed")]
    ListenerClosed { collection: Collection },

    // =========================================================================
    // Cache Errors
    // =========================================================================
    /// Local cache read or write failed.
    #[error("Database error: {0}")]
    DatabaseError(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<bazaar_db::DbError> for SyncError {
    fn from(err: bazaar_db::DbError) -> Self {
        SyncError::DatabaseError(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if the failure came from the remote side.
    pub fn is_remote_error(&self) -> bool {
        matches!(
            self,
            SyncError::Remote(_) | SyncError::ListenerClosed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert!(SyncError::InvalidConfig("empty".into()).is_config_error());
        assert!(!SyncError::InvalidConfig("empty".into()).is_remote_error());

        let remote: SyncError = RemoteError::PermissionDenied("rules".into()).into();
        assert!(remote.is_remote_error());
        assert!(SyncError::ListenerClosed {
            collection: Collection::Products
        }
        .is_remote_error());

        assert!(!SyncError::DatabaseError("locked".into()).is_config_error());
    }

    #[test]
    fn test_error_display() {
        let err = SyncError::ListenerClosed {
            collection: Collection::Categories,
        };
        assert_eq!(err.to_string(), "Listener for categories closed");

        let err: SyncError = RemoteError::Unavailable("offline".into()).into();
        assert!(err.to_string().contains("offline"));
    }
}
