use crate::{ItemId, ItemStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A content item as held by the content store.
///
/// Groups are content items too; they are told apart by `item_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ItemId,
    pub item_type: String,
    pub title: String,
    pub status: ItemStatus,
    /// One value per key.
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
    pub created_at: i64,
    pub modified_at: i64,
}

impl ContentItem {
    /// Returns a metadata value, treating an empty string as absent.
    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }
}

/// Everything a store needs to create a content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub item_type: String,
    pub title: String,
    pub status: ItemStatus,
}

impl NewItem {
    pub fn new(item_type: impl Into<String>, title: impl Into<String>, status: ItemStatus) -> Self {
        Self {
            item_type: item_type.into(),
            title: title.into(),
            status,
        }
    }

    /// Shorthand for a draft of the given type.
    pub fn draft(item_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(item_type, title, ItemStatus::Draft)
    }
}

/// A status change reported by the store after it has been written.
///
/// `item` reflects the state after the change.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTransition {
    pub item: ContentItem,
    pub old_status: ItemStatus,
    pub new_status: ItemStatus,
}

impl StatusTransition {
    /// True when the item went from any other status to published.
    pub fn is_first_publish(&self) -> bool {
        self.new_status.is_published() && !self.old_status.is_published()
    }
}
