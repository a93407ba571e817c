//! Publish cascade: when one member of a group is published, publish the rest.

use crate::{GroupingPolicy, MembershipIndex, PublisherResult, ReentrancyGuard};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use syncpub_store::{ContentListener, ContentStore, StoreError};
use syncpub_types::{ItemId, ItemStatus, StatusTransition};
use tracing::{debug, info, warn};

/// Outcome of one cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    /// The item whose publication started the cascade.
    pub trigger: ItemId,
    pub group: ItemId,
    /// Siblings that were published and left the group, in processing order.
    pub published: Vec<ItemId>,
    /// Siblings whose update failed; they are still in the group.
    pub failed: Vec<ItemId>,
    /// Trashed siblings left untouched; they are still in the group.
    pub skipped: Vec<ItemId>,
    pub group_deleted: bool,
}

/// Running totals since the engine was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeStats {
    /// Cascades that reached the publishing loop.
    pub cascades: u64,
    /// Transitions ignored because they were caused by a running cascade.
    pub suppressed: u64,
    pub published: u64,
    pub failed: u64,
}

/// Reacts to status transitions and republishes the other members of a group.
pub struct PublishCascade {
    policy: Arc<dyn GroupingPolicy>,
    cascades: AtomicU64,
    suppressed: AtomicU64,
    published: AtomicU64,
    failed: AtomicU64,
}

impl PublishCascade {
    pub fn new(policy: Arc<dyn GroupingPolicy>) -> Self {
        Self {
            policy,
            cascades: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
            published: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> CascadeStats {
        CascadeStats {
            cascades: self.cascades.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// Runs the cascade for one transition.
    ///
    /// Returns `None` when the transition does not concern a grouped item:
    /// not a first publish, outside the configured types or source statuses,
    /// not a member, or fired by a cascade already publishing on this thread
    /// through the same store. A member that was the last one in its group
    /// yields a report with no siblings. Trashed siblings are skipped and
    /// stay in the group.
    pub fn handle_transition(
        &self,
        store: &dyn ContentStore,
        transition: &StatusTransition,
    ) -> PublisherResult<Option<CascadeReport>> {
        if ReentrancyGuard::for_store(store).is_active() {
            self.suppressed.fetch_add(1, Ordering::Relaxed);
            debug!("Cascade already running on this store, ignoring {}", transition.item.id);
            return Ok(None);
        }

        if !transition.is_first_publish() {
            return Ok(None);
        }

        let item = &transition.item;
        if !self.policy.is_groupable_type(&item.item_type)
            || !self.policy.is_groupable_status(&transition.old_status)
        {
            debug!(
                "Item {} (type={}, from={}) is not groupable",
                item.id, item.item_type, transition.old_status
            );
            return Ok(None);
        }

        let index = MembershipIndex::new(store);
        let Some(group) = index.get_group(item.id)? else {
            return Ok(None);
        };

        // The trigger leaves the group before siblings are queried, so it is
        // never part of its own sibling set.
        index.clear_group(item.id)?;
        let siblings = index.members_of(group, None)?;

        let mut report = CascadeReport {
            trigger: item.id,
            group,
            published: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
            group_deleted: false,
        };
        if siblings.is_empty() {
            debug!("Item {} was the last member of group {}", item.id, group);
            return Ok(Some(report));
        }

        self.cascades.fetch_add(1, Ordering::Relaxed);
        self.publish_siblings(&index, store, &siblings, &mut report);

        if self.policy.delete_group_on_publish() {
            report.group_deleted = delete_if_empty(&index, store, group);
        }

        info!(
            "Group {} cascade from {}: {} published, {} failed, {} skipped{}",
            group,
            item.id,
            report.published.len(),
            report.failed.len(),
            report.skipped.len(),
            if report.group_deleted { ", group deleted" } else { "" }
        );
        Ok(Some(report))
    }

    fn publish_siblings(
        &self,
        index: &MembershipIndex<'_>,
        store: &dyn ContentStore,
        siblings: &[ItemId],
        report: &mut CascadeReport,
    ) {
        let _token = ReentrancyGuard::for_store(store).enter();

        for &sibling in siblings {
            if is_trashed(store, sibling) {
                debug!("Skipping trashed {} in group {}", sibling, report.group);
                report.skipped.push(sibling);
                continue;
            }
            match store.update_status(sibling, ItemStatus::Published) {
                Ok(()) => {
                    if let Err(e) = index.clear_group(sibling) {
                        warn!("Published {} but could not clear its group: {}", sibling, e);
                    }
                    self.published.fetch_add(1, Ordering::Relaxed);
                    report.published.push(sibling);
                }
                Err(e) => {
                    warn!("Failed to publish {} in group {}: {}", sibling, report.group, e);
                    self.failed.fetch_add(1, Ordering::Relaxed);
                    report.failed.push(sibling);
                }
            }
        }
    }
}

// An unreadable sibling is not skipped; its update reports the failure.
fn is_trashed(store: &dyn ContentStore, id: ItemId) -> bool {
    matches!(store.read(id), Ok(item) if item.status == ItemStatus::Trash)
}

/// Hard-deletes `group` if nothing is left in it. Best effort.
fn delete_if_empty(index: &MembershipIndex<'_>, store: &dyn ContentStore, group: ItemId) -> bool {
    match index.members_of(group, None) {
        Ok(remaining) if remaining.is_empty() => {}
        Ok(remaining) => {
            debug!("Keeping group {}: {} member(s) left", group, remaining.len());
            return false;
        }
        Err(e) => {
            warn!("Could not check remaining members of group {}: {}", group, e);
            return false;
        }
    }

    match store.delete(group, true) {
        Ok(()) => true,
        Err(StoreError::NotFound(_)) => {
            debug!("Group {} was already gone", group);
            false
        }
        Err(e) => {
            warn!("Failed to delete emptied group {}: {}", group, e);
            false
        }
    }
}

impl ContentListener for PublishCascade {
    fn on_status_transition(&self, store: &dyn ContentStore, transition: &StatusTransition) {
        if let Err(e) = self.handle_transition(store, transition) {
            warn!("Cascade for {} aborted: {}", transition.item.id, e);
        }
    }
}
