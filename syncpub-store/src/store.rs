use crate::{ContentListener, StoreResult, TransitionValidator};
use std::sync::Arc;
use syncpub_types::{ContentItem, ItemId, ItemStatus, NewItem};

/// Basic CRUD over content items plus key/value metadata.
///
/// Implementations must deliver notifications synchronously: by the time
/// `update_status` or `delete` returns, every subscribed listener has run.
pub trait ContentStore: Send + Sync {
    /// Creates an item. Creation is not a status transition.
    fn create(&self, item: NewItem) -> StoreResult<ContentItem>;

    /// Reads an item with its metadata. Missing items are `StoreError::NotFound`.
    fn read(&self, id: ItemId) -> StoreResult<ContentItem>;

    /// Writes a new status and notifies listeners with the old and new values.
    fn update_status(&self, id: ItemId, status: ItemStatus) -> StoreResult<()>;

    /// Hard delete removes the item and its metadata; soft delete moves it to trash.
    fn delete(&self, id: ItemId, hard: bool) -> StoreResult<()>;

    /// Returns the value for `key`, or `None` if the item or key is absent.
    fn get_meta(&self, id: ItemId, key: &str) -> StoreResult<Option<String>>;

    /// Inserts or overwrites the value for `key`.
    fn set_meta(&self, id: ItemId, key: &str, value: &str) -> StoreResult<()>;

    /// Removes `key`; returns whether a value existed.
    fn delete_meta(&self, id: ItemId, key: &str) -> StoreResult<bool>;

    /// Ids of items whose `key` equals `value`, in insertion order.
    fn query_by_meta(&self, key: &str, value: &str) -> StoreResult<Vec<ItemId>>;

    /// Removes `key` from every item where it equals `value`; returns the count.
    fn delete_meta_by_value(&self, key: &str, value: &str) -> StoreResult<usize>;

    /// All items of one type, in insertion order.
    fn list_by_type(&self, item_type: &str) -> StoreResult<Vec<ContentItem>>;

    fn subscribe(&self, listener: Arc<dyn ContentListener>);

    fn add_validator(&self, validator: Arc<dyn TransitionValidator>);
}
