//! Error types for the content store.

use syncpub_types::ItemId;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Item not found.
    #[error("item not found: {0}")]
    NotFound(ItemId),

    /// A validator refused the status change.
    #[error("status change rejected for {id}: {reason}")]
    Rejected { id: ItemId, reason: String },

    /// A stored row could not be decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The connection mutex was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,
}
