//! The composed publisher service.

use crate::groups::{self, Group, GroupSummary};
use crate::{
    CascadeStats, GroupMaintenance, GroupingPolicy, MembershipIndex, PublishCascade,
    PublisherConfig, PublisherError, PublisherResult,
};
use std::sync::Arc;
use syncpub_store::{ContentStore, StoreError};
use syncpub_types::{ContentItem, ItemId};
use tracing::info;

/// Everything the publisher needs, built once at startup and shared by
/// reference (or cheap clone) with request handlers.
///
/// Construction subscribes the cascade and the maintenance listener to the
/// store, so any status change made through the store is covered, not only
/// the ones made through this type.
pub struct SyncPublisher<S> {
    store: Arc<S>,
    config: Arc<PublisherConfig>,
    cascade: Arc<PublishCascade>,
    maintenance: Arc<GroupMaintenance>,
}

impl<S> Clone for SyncPublisher<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
            cascade: self.cascade.clone(),
            maintenance: self.maintenance.clone(),
        }
    }
}

impl<S: ContentStore> SyncPublisher<S> {
    pub fn new(store: Arc<S>, config: PublisherConfig) -> Self {
        let config = Arc::new(config);
        let cascade = Arc::new(PublishCascade::new(config.clone()));
        let maintenance = Arc::new(GroupMaintenance::new());

        store.subscribe(cascade.clone());
        store.subscribe(maintenance.clone());
        info!(
            "Publisher ready (types={:?}, delete_group_on_publish={})",
            config.groupable_types, config.delete_group_on_publish
        );

        Self {
            store,
            config,
            cascade,
            maintenance,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    pub fn cascade_stats(&self) -> CascadeStats {
        self.cascade.stats()
    }

    fn index(&self) -> MembershipIndex<'_> {
        MembershipIndex::new(&*self.store)
    }

    // ── Groups ───────────────────────────────────────────────────

    pub fn create_group(&self, title: &str) -> PublisherResult<Group> {
        let group = groups::create_group(&*self.store, title)?;
        info!("Created group {} ({:?})", group.id, group.title);
        Ok(group)
    }

    pub fn find_group(&self, id: ItemId) -> PublisherResult<Option<Group>> {
        groups::find_group(&*self.store, id)
    }

    pub fn groups(&self) -> PublisherResult<Vec<GroupSummary>> {
        groups::list_groups(&*self.store)
    }

    /// Items waiting in `group_id`, in cascade order.
    pub fn members(&self, group_id: ItemId) -> PublisherResult<Vec<ContentItem>> {
        let mut members = Vec::new();
        for id in self.index().members_of(group_id, None)? {
            match self.store.read(id) {
                Ok(item) => members.push(item),
                Err(StoreError::NotFound(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(members)
    }

    // ── Membership ───────────────────────────────────────────────

    pub fn group_of(&self, item_id: ItemId) -> PublisherResult<Option<ItemId>> {
        self.index().get_group(item_id)
    }

    /// Whether the editor should offer grouping for `item`.
    pub fn can_be_grouped(&self, item: &ContentItem) -> bool {
        self.config.can_be_grouped(item)
    }

    /// Places an item into a group after checking both ends.
    pub fn assign(&self, item_id: ItemId, group_id: ItemId) -> PublisherResult<()> {
        if self.find_group(group_id)?.is_none() {
            return Err(PublisherError::GroupNotFound(group_id));
        }
        let item = self.store.read(item_id)?;
        if !self.can_be_grouped(&item) {
            return Err(PublisherError::NotGroupable {
                id: item_id,
                reason: format!("type {:?} with status {}", item.item_type, item.status),
            });
        }
        self.index().set_group(item_id, group_id)
    }

    pub fn remove_member(&self, group_id: ItemId, item_id: ItemId) -> PublisherResult<bool> {
        let removed = self
            .maintenance
            .remove_member(&*self.store, group_id, item_id)?;
        if removed {
            info!("Removed {} from group {}", item_id, group_id);
        }
        Ok(removed)
    }
}
