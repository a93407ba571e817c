//! Core type definitions for the synchronized publisher.
//!
//! This crate defines the store-agnostic types shared by every other crate:
//! - Content item identifiers (UUID v7)
//! - Item statuses, with `publish` as the one status the cascade cares about
//! - Content items, creation requests, and status transitions
//!
//! Grouping semantics live in `syncpub-core`; nothing here knows about groups.

mod ids;
mod item;
mod status;

pub use ids::ItemId;
pub use item::{ContentItem, NewItem, StatusTransition};
pub use status::ItemStatus;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid item id: {0}")]
    InvalidId(#[from] uuid::Error),

    #[error("invalid item status: {0:?}")]
    InvalidStatus(String),
}
