//! Content store for the synchronized publisher.
//!
//! The publisher never owns content; it reads and updates items through the
//! [`ContentStore`] trait and learns about status changes and deletions by
//! subscribing a [`ContentListener`].
//!
//! # Architecture
//!
//! - Items are rows keyed by id, with an insertion sequence giving a stable order
//! - Metadata is one value per `(item, key)`, indexed by `(key, value)` for lookups
//! - Listeners are called synchronously after each write, outside the connection lock,
//!   so they may write back into the store
//! - Validators can veto a status change before it is written

mod error;
mod hooks;
mod sqlite;
mod store;

pub use error::{StoreError, StoreResult};
pub use hooks::{ContentListener, Hooks, TransitionValidator};
pub use sqlite::SqliteStore;
pub use store::ContentStore;
