//! Membership cleanup for deleted groups and explicit removals.

use crate::{GROUP_ITEM_TYPE, MembershipIndex, PublisherResult, SYNC_GROUP_KEY};
use syncpub_store::{ContentListener, ContentStore};
use syncpub_types::{ContentItem, ItemId};
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct GroupMaintenance;

impl GroupMaintenance {
    pub fn new() -> Self {
        Self
    }

    /// Handles a hard delete. If `item` was a group, every membership pointing
    /// at it is removed; returns how many.
    ///
    /// A deleted member needs nothing: its metadata went with it.
    pub fn clear_deleted_group(
        &self,
        store: &dyn ContentStore,
        item: &ContentItem,
    ) -> PublisherResult<usize> {
        if item.item_type != GROUP_ITEM_TYPE {
            return Ok(0);
        }
        let cleared = store.delete_meta_by_value(SYNC_GROUP_KEY, &item.id.to_string())?;
        if cleared > 0 {
            info!("Group {} deleted, released {} member(s)", item.id, cleared);
        }
        Ok(cleared)
    }

    /// Takes `item_id` out of `group_id`.
    ///
    /// Returns `false` without touching anything when the item is not in that
    /// group, so repeating a removal is harmless.
    pub fn remove_member(
        &self,
        store: &dyn ContentStore,
        group_id: ItemId,
        item_id: ItemId,
    ) -> PublisherResult<bool> {
        let index = MembershipIndex::new(store);
        match index.get_group(item_id)? {
            Some(current) if current == group_id => index.clear_group(item_id),
            _ => Ok(false),
        }
    }
}

impl ContentListener for GroupMaintenance {
    fn on_item_deleted(&self, store: &dyn ContentStore, item: &ContentItem) {
        if let Err(e) = self.clear_deleted_group(store, item) {
            warn!("Failed to release members of deleted item {}: {}", item.id, e);
        }
    }
}
