use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use syncpub_admin::{
    ErrorBody, GroupView, ItemView, PUBLISH_CONFIRMATION, REMOVED_MESSAGE, build_router,
    group_url, remove_member_url,
};
use syncpub_core::{Group, GroupSummary, PublisherConfig, SyncPublisher};
use syncpub_store::{
    ContentListener, ContentStore, SqliteStore, StoreResult, TransitionValidator,
};
use syncpub_types::{ContentItem, ItemId, ItemStatus, NewItem};

struct Fixture {
    base: String,
    publisher: SyncPublisher<SqliteStore>,
}

/// Spin up the HTTP server on an OS-assigned port over an in-memory store.
async fn spawn_test_server() -> Fixture {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let publisher = SyncPublisher::new(store, PublisherConfig::default());
    let base = serve(build_router(publisher.clone())).await;
    Fixture { base, publisher }
}

async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn draft(publisher: &SyncPublisher<SqliteStore>, title: &str) -> ItemId {
    publisher
        .store()
        .create(NewItem::draft("post", title))
        .unwrap()
        .id
}

fn group_with(publisher: &SyncPublisher<SqliteStore>, titles: &[&str]) -> (Group, Vec<ItemId>) {
    let group = publisher.create_group("Launch").unwrap();
    let ids = titles
        .iter()
        .map(|title| {
            let id = draft(publisher, title);
            publisher.assign(id, group.id).unwrap();
            id
        })
        .collect();
    (group, ids)
}

fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get("location")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn remove_link_redirects_with_notice() {
    let fx = spawn_test_server().await;
    let (group, ids) = group_with(&fx.publisher, &["A", "B"]);

    let resp = client()
        .get(format!("{}{}", fx.base, remove_member_url(group.id, ids[0])))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 303);
    assert_eq!(
        location(&resp),
        format!("/admin/groups/{}?wp-spp-notice=removed", group.id)
    );
    assert_eq!(fx.publisher.group_of(ids[0]).unwrap(), None);
    assert_eq!(fx.publisher.group_of(ids[1]).unwrap(), Some(group.id));
}

#[tokio::test]
async fn remove_link_for_non_member_redirects_without_notice() {
    let fx = spawn_test_server().await;
    let (group, _) = group_with(&fx.publisher, &["A"]);
    let outsider = draft(&fx.publisher, "Outsider");

    let resp = client()
        .get(format!("{}{}", fx.base, remove_member_url(group.id, outsider)))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), group_url(group.id));
}

#[tokio::test]
async fn remove_link_for_member_of_other_group_leaves_it_alone() {
    let fx = spawn_test_server().await;
    let (first, ids) = group_with(&fx.publisher, &["A"]);
    let second = fx.publisher.create_group("Other").unwrap();

    let resp = client()
        .get(format!("{}{}", fx.base, remove_member_url(second.id, ids[0])))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), group_url(second.id));
    assert_eq!(fx.publisher.group_of(ids[0]).unwrap(), Some(first.id));
}

#[tokio::test]
async fn remove_link_with_unparsable_item_redirects_back() {
    let fx = spawn_test_server().await;
    let (group, _) = group_with(&fx.publisher, &["A"]);

    let resp = client()
        .get(format!(
            "{}/admin/remove-member?wp_spp_action=remove_post&spp_group_id={}&spp_post_id=abc",
            fx.base, group.id
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), group_url(group.id));
}

#[tokio::test]
async fn remove_link_with_unknown_action_changes_nothing() {
    let fx = spawn_test_server().await;
    let (group, ids) = group_with(&fx.publisher, &["A"]);

    let resp = client()
        .get(format!(
            "{}/admin/remove-member?wp_spp_action=delete&spp_group_id={}&spp_post_id={}",
            fx.base, group.id, ids[0]
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), group_url(group.id));
    assert_eq!(fx.publisher.group_of(ids[0]).unwrap(), Some(group.id));
}

#[tokio::test]
async fn remove_link_rejects_bad_group_id() {
    let fx = spawn_test_server().await;

    let resp = client()
        .get(format!(
            "{}/admin/remove-member?wp_spp_action=remove_post&spp_group_id=nope",
            fx.base
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: ErrorBody = resp.json().await.unwrap();
    assert!(body.error.contains("group id"));
}

#[tokio::test]
async fn group_view_lists_members_with_remove_links() {
    let fx = spawn_test_server().await;
    let (group, ids) = group_with(&fx.publisher, &["A", "B"]);

    let resp = reqwest::get(format!("{}{}", fx.base, group_url(group.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let view: GroupView = resp.json().await.unwrap();
    assert_eq!(view.group, group);
    assert_eq!(view.notice, None);
    let member_ids: Vec<ItemId> = view.members.iter().map(|m| m.id).collect();
    assert_eq!(member_ids, ids);
    assert_eq!(view.members[1].title, "B");
    assert_eq!(view.members[1].remove_url, remove_member_url(group.id, ids[1]));
}

#[tokio::test]
async fn group_view_shows_removed_notice() {
    let fx = spawn_test_server().await;
    let (group, _) = group_with(&fx.publisher, &["A"]);

    let view: GroupView = reqwest::get(format!(
        "{}{}?wp-spp-notice=removed",
        fx.base,
        group_url(group.id)
    ))
    .await
    .unwrap()
    .json()
    .await
    .unwrap();

    assert_eq!(view.notice.as_deref(), Some(REMOVED_MESSAGE));
}

#[tokio::test]
async fn group_view_ignores_other_notices() {
    let fx = spawn_test_server().await;
    let (group, _) = group_with(&fx.publisher, &["A"]);

    let view: GroupView = reqwest::get(format!(
        "{}{}?wp-spp-notice=bogus",
        fx.base,
        group_url(group.id)
    ))
    .await
    .unwrap()
    .json()
    .await
    .unwrap();

    assert_eq!(view.notice, None);
}

#[tokio::test]
async fn group_view_for_plain_item_is_404() {
    let fx = spawn_test_server().await;
    let item = draft(&fx.publisher, "Not a group");

    let resp = reqwest::get(format!("{}{}", fx.base, group_url(item)))
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn group_list_reports_member_counts() {
    let fx = spawn_test_server().await;
    let (group, _) = group_with(&fx.publisher, &["A", "B", "C"]);

    let resp = reqwest::get(format!("{}/api/v1/groups", fx.base))
        .await
        .unwrap();
    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.contains("application/json"));

    let groups: Vec<GroupSummary> = resp.json().await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].group, group);
    assert_eq!(groups[0].member_count, 3);
}

#[tokio::test]
async fn item_view_of_grouped_item_carries_confirmation() {
    let fx = spawn_test_server().await;
    let (group, ids) = group_with(&fx.publisher, &["A"]);

    let view: ItemView = reqwest::get(format!("{}/api/v1/items/{}", fx.base, ids[0]))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(view.item.id, ids[0]);
    assert_eq!(view.group, Some(group.id));
    assert!(view.can_group);
    assert_eq!(view.publish_confirmation.as_deref(), Some(PUBLISH_CONFIRMATION));
}

#[tokio::test]
async fn item_view_of_ungrouped_item_has_no_confirmation() {
    let fx = spawn_test_server().await;
    let id = draft(&fx.publisher, "Loose");

    let view: ItemView = reqwest::get(format!("{}/api/v1/items/{}", fx.base, id))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(view.group, None);
    assert_eq!(view.publish_confirmation, None);
}

#[tokio::test]
async fn missing_item_is_404() {
    let fx = spawn_test_server().await;

    let resp = reqwest::get(format!("{}/api/v1/items/{}", fx.base, ItemId::new()))
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let fx = spawn_test_server().await;
    let resp = reqwest::get(format!("{}/api/v1/nonexistent", fx.base))
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
}

// ── Executor ─────────────────────────────────────────────────────

/// Records the thread of every store call.
struct ThreadTrackingStore {
    inner: SqliteStore,
    threads: Mutex<Vec<ThreadId>>,
}

impl ThreadTrackingStore {
    fn record(&self) {
        self.threads.lock().unwrap().push(thread::current().id());
    }

    fn take(&self) -> Vec<ThreadId> {
        std::mem::take(&mut *self.threads.lock().unwrap())
    }
}

impl ContentStore for ThreadTrackingStore {
    fn create(&self, item: NewItem) -> StoreResult<ContentItem> {
        self.record();
        self.inner.create(item)
    }

    fn read(&self, id: ItemId) -> StoreResult<ContentItem> {
        self.record();
        self.inner.read(id)
    }

    fn update_status(&self, id: ItemId, status: ItemStatus) -> StoreResult<()> {
        self.record();
        self.inner.update_status(id, status)
    }

    fn delete(&self, id: ItemId, hard: bool) -> StoreResult<()> {
        self.record();
        self.inner.delete(id, hard)
    }

    fn get_meta(&self, id: ItemId, key: &str) -> StoreResult<Option<String>> {
        self.record();
        self.inner.get_meta(id, key)
    }

    fn set_meta(&self, id: ItemId, key: &str, value: &str) -> StoreResult<()> {
        self.record();
        self.inner.set_meta(id, key, value)
    }

    fn delete_meta(&self, id: ItemId, key: &str) -> StoreResult<bool> {
        self.record();
        self.inner.delete_meta(id, key)
    }

    fn query_by_meta(&self, key: &str, value: &str) -> StoreResult<Vec<ItemId>> {
        self.record();
        self.inner.query_by_meta(key, value)
    }

    fn delete_meta_by_value(&self, key: &str, value: &str) -> StoreResult<usize> {
        self.record();
        self.inner.delete_meta_by_value(key, value)
    }

    fn list_by_type(&self, item_type: &str) -> StoreResult<Vec<ContentItem>> {
        self.record();
        self.inner.list_by_type(item_type)
    }

    fn subscribe(&self, listener: Arc<dyn ContentListener>) {
        self.inner.subscribe(listener)
    }

    fn add_validator(&self, validator: Arc<dyn TransitionValidator>) {
        self.inner.add_validator(validator)
    }
}

// The current-thread runtime polls every task on the test thread, so any
// store call seen there ran on the executor.
#[tokio::test]
async fn store_work_runs_off_the_executor_thread() {
    let store = Arc::new(ThreadTrackingStore {
        inner: SqliteStore::open_in_memory().unwrap(),
        threads: Mutex::new(Vec::new()),
    });
    let publisher = SyncPublisher::new(store.clone(), PublisherConfig::default());
    let group = publisher.create_group("Launch").unwrap();
    let item = store.create(NewItem::draft("post", "A")).unwrap();
    publisher.assign(item.id, group.id).unwrap();
    let base = serve(build_router(publisher)).await;
    store.take();

    let http = client();
    for path in [
        remove_member_url(group.id, item.id),
        group_url(group.id),
        "/api/v1/groups".to_string(),
        format!("/api/v1/items/{}", item.id),
    ] {
        let resp = http.get(format!("{base}{path}")).send().await.unwrap();
        assert!(resp.status().is_success() || resp.status().is_redirection());
    }

    let executor = thread::current().id();
    let threads = store.take();
    assert!(!threads.is_empty());
    assert!(threads.iter().all(|t| *t != executor));
}
