//! Group registry.
//!
//! A group is an ordinary content item of type [`GROUP_ITEM_TYPE`] that
//! carries nothing but its id and title. Membership lives on the members.

use crate::{GROUP_ITEM_TYPE, MembershipIndex, PublisherResult};
use serde::{Deserialize, Serialize};
use syncpub_store::{ContentStore, StoreError};
use syncpub_types::{ContentItem, ItemId, ItemStatus, NewItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: ItemId,
    pub title: String,
}

impl Group {
    /// Returns the group view of `item`, or `None` if it is not a group.
    pub fn from_item(item: &ContentItem) -> Option<Self> {
        (item.item_type == GROUP_ITEM_TYPE).then(|| Self {
            id: item.id,
            title: item.title.clone(),
        })
    }
}

/// A group with the number of items currently waiting in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group: Group,
    pub member_count: usize,
}

pub fn create_group(store: &dyn ContentStore, title: &str) -> PublisherResult<Group> {
    let item = store.create(NewItem::new(GROUP_ITEM_TYPE, title, ItemStatus::Published))?;
    Ok(Group {
        id: item.id,
        title: item.title,
    })
}

/// Looks up a live group. Missing, trashed and non-group items are all `None`.
pub fn find_group(store: &dyn ContentStore, id: ItemId) -> PublisherResult<Option<Group>> {
    match store.read(id) {
        Ok(item) if item.status == ItemStatus::Trash => Ok(None),
        Ok(item) => Ok(Group::from_item(&item)),
        Err(StoreError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_groups(store: &dyn ContentStore) -> PublisherResult<Vec<GroupSummary>> {
    let index = MembershipIndex::new(store);
    let mut summaries = Vec::new();
    for item in store.list_by_type(GROUP_ITEM_TYPE)? {
        if item.status == ItemStatus::Trash {
            continue;
        }
        let member_count = index.members_of(item.id, None)?.len();
        summaries.push(GroupSummary {
            group: Group {
                id: item.id,
                title: item.title,
            },
            member_count,
        });
    }
    Ok(summaries)
}
