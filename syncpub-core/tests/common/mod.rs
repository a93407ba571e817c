#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use syncpub_core::{Group, PublisherConfig, SyncPublisher};
use syncpub_store::{
    ContentListener, ContentStore, SqliteStore, StoreResult, TransitionValidator,
};
use syncpub_types::{ContentItem, ItemId, ItemStatus, NewItem};

pub fn setup(config: PublisherConfig) -> (Arc<SqliteStore>, SyncPublisher<SqliteStore>) {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let publisher = SyncPublisher::new(store.clone(), config);
    (store, publisher)
}

pub fn deleting_config() -> PublisherConfig {
    PublisherConfig {
        delete_group_on_publish: true,
        ..PublisherConfig::default()
    }
}

pub fn draft(store: &SqliteStore, title: &str) -> ContentItem {
    store.create(NewItem::draft("post", title)).unwrap()
}

/// Creates a group holding one fresh draft post per title.
pub fn group_with(
    store: &SqliteStore,
    publisher: &SyncPublisher<SqliteStore>,
    titles: &[&str],
) -> (Group, Vec<ItemId>) {
    let group = publisher.create_group("Launch").unwrap();
    let ids = titles
        .iter()
        .map(|title| {
            let item = draft(store, title);
            publisher.assign(item.id, group.id).unwrap();
            item.id
        })
        .collect();
    (group, ids)
}

pub fn status(store: &SqliteStore, id: ItemId) -> ItemStatus {
    store.read(id).unwrap().status
}

/// Rejects any status change of the listed items.
#[derive(Default)]
pub struct RejectIds(pub Mutex<HashSet<ItemId>>);

impl RejectIds {
    pub fn with(ids: impl IntoIterator<Item = ItemId>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(ids.into_iter().collect())))
    }

    pub fn allow(&self, id: ItemId) {
        self.0.lock().unwrap().remove(&id);
    }
}

impl TransitionValidator for RejectIds {
    fn validate(&self, item: &ContentItem, _new_status: &ItemStatus) -> Result<(), String> {
        if self.0.lock().unwrap().contains(&item.id) {
            Err("rejected by test".to_string())
        } else {
            Ok(())
        }
    }
}

/// Delegates to an inner store and counts member queries.
pub struct CountingStore {
    pub inner: SqliteStore,
    pub meta_queries: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::open_in_memory().unwrap(),
            meta_queries: AtomicUsize::new(0),
        }
    }

    pub fn queries(&self) -> usize {
        self.meta_queries.load(Ordering::SeqCst)
    }
}

impl ContentStore for CountingStore {
    fn create(&self, item: NewItem) -> StoreResult<ContentItem> {
        self.inner.create(item)
    }

    fn read(&self, id: ItemId) -> StoreResult<ContentItem> {
        self.inner.read(id)
    }

    fn update_status(&self, id: ItemId, status: ItemStatus) -> StoreResult<()> {
        self.inner.update_status(id, status)
    }

    fn delete(&self, id: ItemId, hard: bool) -> StoreResult<()> {
        self.inner.delete(id, hard)
    }

    fn get_meta(&self, id: ItemId, key: &str) -> StoreResult<Option<String>> {
        self.inner.get_meta(id, key)
    }

    fn set_meta(&self, id: ItemId, key: &str, value: &str) -> StoreResult<()> {
        self.inner.set_meta(id, key, value)
    }

    fn delete_meta(&self, id: ItemId, key: &str) -> StoreResult<bool> {
        self.inner.delete_meta(id, key)
    }

    fn query_by_meta(&self, key: &str, value: &str) -> StoreResult<Vec<ItemId>> {
        self.meta_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.query_by_meta(key, value)
    }

    fn delete_meta_by_value(&self, key: &str, value: &str) -> StoreResult<usize> {
        self.inner.delete_meta_by_value(key, value)
    }

    fn list_by_type(&self, item_type: &str) -> StoreResult<Vec<ContentItem>> {
        self.inner.list_by_type(item_type)
    }

    fn subscribe(&self, listener: Arc<dyn ContentListener>) {
        self.inner.subscribe(listener)
    }

    fn add_validator(&self, validator: Arc<dyn TransitionValidator>) {
        self.inner.add_validator(validator)
    }
}
