//! Error types for the publisher.

use std::path::PathBuf;
use syncpub_store::StoreError;
use syncpub_types::ItemId;
use thiserror::Error;

/// Result type for publisher operations.
pub type PublisherResult<T> = Result<T, PublisherError>;

/// Errors that can occur in publisher operations.
///
/// Expected conditions (non-members, empty groups, items outside the
/// configured types) are not errors; they show up as `None`, `false` or an
/// absent cascade report.
#[derive(Debug, Error)]
pub enum PublisherError {
    /// Content store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The target does not exist or is not a group item.
    #[error("group not found: {0}")]
    GroupNotFound(ItemId),

    /// The item may not join a group in its current state.
    #[error("item {id} cannot be grouped: {reason}")]
    NotGroupable { id: ItemId, reason: String },

    /// Configuration file could not be read.
    #[error("failed to read config {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
