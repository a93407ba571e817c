//! Synchronized publishing of grouped content items.
//!
//! Items are placed into groups through a metadata key on the item itself.
//! When one member of a group is published, every other member is published
//! in the same call, and the group can optionally be deleted once empty.
//!
//! # Components
//!
//! - **Group registry** ([`groups`]): groups are content items of type [`GROUP_ITEM_TYPE`]
//! - **Membership index** ([`MembershipIndex`]): `item -> group` via the [`SYNC_GROUP_KEY`] metadata key
//! - **Publish cascade** ([`PublishCascade`]): reacts to status transitions and republishes siblings
//! - **Group maintenance** ([`GroupMaintenance`]): clears memberships when groups are deleted
//! - **Service** ([`SyncPublisher`]): wires the above onto a [`ContentStore`](syncpub_store::ContentStore)
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use syncpub_core::{PublisherConfig, SyncPublisher};
//! use syncpub_store::{ContentStore, SqliteStore};
//! use syncpub_types::{ItemStatus, NewItem};
//!
//! let store = Arc::new(SqliteStore::open_in_memory().unwrap());
//! let publisher = SyncPublisher::new(store.clone(), PublisherConfig::default());
//!
//! let group = publisher.create_group("Launch day").unwrap();
//! let a = store.create(NewItem::draft("post", "Announcement")).unwrap();
//! let b = store.create(NewItem::draft("post", "Release notes")).unwrap();
//! publisher.assign(a.id, group.id).unwrap();
//! publisher.assign(b.id, group.id).unwrap();
//!
//! store.update_status(a.id, ItemStatus::Published).unwrap();
//! assert_eq!(store.read(b.id).unwrap().status, ItemStatus::Published);
//! ```

mod cascade;
mod config;
mod error;
pub mod groups;
mod guard;
mod maintenance;
mod membership;
mod service;

pub use cascade::{CascadeReport, CascadeStats, PublishCascade};
pub use config::{GroupingPolicy, PublisherConfig};
pub use error::{PublisherError, PublisherResult};
pub use groups::{Group, GroupSummary};
pub use guard::{GuardToken, ReentrancyGuard};
pub use maintenance::GroupMaintenance;
pub use membership::MembershipIndex;
pub use service::SyncPublisher;

/// Item type of group items.
pub const GROUP_ITEM_TYPE: &str = "spp_group";

/// Metadata key holding an item's group id.
pub const SYNC_GROUP_KEY: &str = "sync_group";
