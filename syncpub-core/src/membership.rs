//! Membership index: which group, if any, an item is waiting in.

use crate::{PublisherResult, SYNC_GROUP_KEY};
use syncpub_store::ContentStore;
use syncpub_types::ItemId;
use tracing::{debug, warn};

/// Reads and writes the `item -> group` relation held in item metadata.
///
/// Every operation is a point read or write against the store; nothing here
/// spans more than one key.
pub struct MembershipIndex<'a> {
    store: &'a dyn ContentStore,
}

impl<'a> MembershipIndex<'a> {
    pub fn new(store: &'a dyn ContentStore) -> Self {
        Self { store }
    }

    /// The item's group, or `None` when unset, empty, or not a valid id.
    pub fn get_group(&self, item_id: ItemId) -> PublisherResult<Option<ItemId>> {
        let Some(value) = self.store.get_meta(item_id, SYNC_GROUP_KEY)? else {
            return Ok(None);
        };
        if value.trim().is_empty() {
            return Ok(None);
        }
        match ItemId::parse(&value) {
            Ok(group_id) => Ok(Some(group_id)),
            Err(e) => {
                warn!("Ignoring unreadable group id {:?} on {}: {}", value, item_id, e);
                Ok(None)
            }
        }
    }

    /// Places the item in `group_id`, replacing any previous group.
    pub fn set_group(&self, item_id: ItemId, group_id: ItemId) -> PublisherResult<()> {
        self.store.set_meta(item_id, SYNC_GROUP_KEY, &group_id.to_string())?;
        debug!("Item {} joined group {}", item_id, group_id);
        Ok(())
    }

    /// Takes the item out of its group. Returns whether it was in one.
    pub fn clear_group(&self, item_id: ItemId) -> PublisherResult<bool> {
        let removed = self.store.delete_meta(item_id, SYNC_GROUP_KEY)?;
        if removed {
            debug!("Item {} left its group", item_id);
        }
        Ok(removed)
    }

    /// Members of `group_id` in store order, optionally leaving one out.
    pub fn members_of(
        &self,
        group_id: ItemId,
        excluding: Option<ItemId>,
    ) -> PublisherResult<Vec<ItemId>> {
        let mut members = self
            .store
            .query_by_meta(SYNC_GROUP_KEY, &group_id.to_string())?;
        if let Some(excluded) = excluding {
            members.retain(|id| *id != excluded);
        }
        Ok(members)
    }
}
