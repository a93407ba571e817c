//! Admin HTTP API for the synchronized publisher.
//!
//! The router is a thin caller of [`SyncPublisher`]: it renders groups and
//! items as JSON and serves the "remove from group" link, which redirects back
//! to the group page with a notice on success.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use syncpub_core::{Group, GroupSummary, PublisherError, SyncPublisher};
use syncpub_store::{ContentStore, StoreError};
use syncpub_types::{ContentItem, ItemId, ItemStatus};
use tracing::warn;

/// `wp_spp_action` value of the remove link.
pub const REMOVE_ACTION: &str = "remove_post";

/// `wp-spp-notice` value set after a successful removal.
pub const NOTICE_REMOVED: &str = "removed";

pub const REMOVED_MESSAGE: &str = "Post removed from group.";

pub const PUBLISH_CONFIRMATION: &str = "This post is part of a Synchronized Post Publisher group. \
     Continuing will also publish all other posts within this group. \
     Click OK to confirm and publish, or Cancel to return.";

// ── Views ────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MemberView {
    pub id: ItemId,
    pub title: String,
    pub item_type: String,
    pub status: ItemStatus,
    pub remove_url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GroupView {
    pub group: Group,
    pub members: Vec<MemberView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ItemView {
    pub item: ContentItem,
    pub group: Option<ItemId>,
    pub can_group: bool,
    /// Prompt to show before publishing, present only for grouped items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_confirmation: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

// ── URLs ─────────────────────────────────────────────────────────

pub fn group_url(group_id: ItemId) -> String {
    format!("/admin/groups/{group_id}")
}

pub fn remove_member_url(group_id: ItemId, item_id: ItemId) -> String {
    format!(
        "/admin/remove-member?wp_spp_action={REMOVE_ACTION}&spp_group_id={group_id}&spp_post_id={item_id}"
    )
}

// ── Errors ───────────────────────────────────────────────────────

pub struct ApiError(StatusCode, String);

impl ApiError {
    fn bad_request(msg: impl Into<String>) -> Self {
        Self(StatusCode::BAD_REQUEST, msg.into())
    }

    fn not_found(msg: impl Into<String>) -> Self {
        Self(StatusCode::NOT_FOUND, msg.into())
    }
}

impl From<PublisherError> for ApiError {
    fn from(e: PublisherError) -> Self {
        match e {
            PublisherError::Store(StoreError::NotFound(id)) | PublisherError::GroupNotFound(id) => {
                Self::not_found(format!("not found: {id}"))
            }
            other => Self(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        PublisherError::from(e).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(ErrorBody { error: self.1 })).into_response()
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self(StatusCode::INTERNAL_SERVER_ERROR, format!("task failed: {e}"))
    }
}

fn parse_id(raw: &str, what: &str) -> Result<ItemId, ApiError> {
    ItemId::parse(raw).map_err(|e| ApiError::bad_request(format!("invalid {what}: {e}")))
}

/// Runs store work off the async executor. A removal or a cascade holds the
/// connection lock for many writes.
async fn blocking<S, T, F>(publisher: SyncPublisher<S>, work: F) -> Result<T, ApiError>
where
    S: ContentStore + 'static,
    T: Send + 'static,
    F: FnOnce(&SyncPublisher<S>) -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || work(&publisher)).await?
}

// ── Handlers ─────────────────────────────────────────────────────

#[derive(Deserialize, Debug, Default)]
pub struct RemoveMemberQuery {
    pub wp_spp_action: Option<String>,
    pub spp_group_id: Option<String>,
    pub spp_post_id: Option<String>,
}

async fn remove_member<S: ContentStore + 'static>(
    State(publisher): State<SyncPublisher<S>>,
    Query(query): Query<RemoveMemberQuery>,
) -> Result<Redirect, ApiError> {
    // Without a group there is no page to send the user back to.
    let group_id = parse_id(query.spp_group_id.as_deref().unwrap_or_default(), "group id")?;
    let back = group_url(group_id);

    if query.wp_spp_action.as_deref() != Some(REMOVE_ACTION) {
        return Ok(Redirect::to(&back));
    }
    let Some(item_id) = query.spp_post_id.as_deref().and_then(|s| ItemId::parse(s).ok()) else {
        return Ok(Redirect::to(&back));
    };

    let removed = blocking(publisher, move |p| Ok(p.remove_member(group_id, item_id))).await?;
    match removed {
        Ok(true) => Ok(Redirect::to(&format!("{back}?wp-spp-notice={NOTICE_REMOVED}"))),
        Ok(false) => Ok(Redirect::to(&back)),
        Err(e) => {
            warn!("Removing {} from group {} failed: {}", item_id, group_id, e);
            Ok(Redirect::to(&back))
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct NoticeQuery {
    #[serde(rename = "wp-spp-notice")]
    pub notice: Option<String>,
}

async fn group_view<S: ContentStore + 'static>(
    State(publisher): State<SyncPublisher<S>>,
    Path(id): Path<String>,
    Query(query): Query<NoticeQuery>,
) -> Result<Json<GroupView>, ApiError> {
    let group_id = parse_id(&id, "group id")?;
    let (group, members) = blocking(publisher, move |p| {
        let group = p
            .find_group(group_id)?
            .ok_or(PublisherError::GroupNotFound(group_id))?;
        Ok((group, p.members(group_id)?))
    })
    .await?;

    let members = members
        .into_iter()
        .map(|item| MemberView {
            remove_url: remove_member_url(group_id, item.id),
            id: item.id,
            title: item.title,
            item_type: item.item_type,
            status: item.status,
        })
        .collect();

    let notice = (query.notice.as_deref() == Some(NOTICE_REMOVED)).then(|| REMOVED_MESSAGE.to_string());
    Ok(Json(GroupView {
        group,
        members,
        notice,
    }))
}

async fn list_groups<S: ContentStore + 'static>(
    State(publisher): State<SyncPublisher<S>>,
) -> Result<Json<Vec<GroupSummary>>, ApiError> {
    let groups = blocking(publisher, |p| Ok(p.groups()?)).await?;
    Ok(Json(groups))
}

async fn item_view<S: ContentStore + 'static>(
    State(publisher): State<SyncPublisher<S>>,
    Path(id): Path<String>,
) -> Result<Json<ItemView>, ApiError> {
    let item_id = parse_id(&id, "item id")?;
    let view = blocking(publisher, move |p| {
        let item = p.store().read(item_id)?;
        let group = p.group_of(item_id)?;
        let can_group = p.can_be_grouped(&item);
        Ok(ItemView {
            publish_confirmation: group.map(|_| PUBLISH_CONFIRMATION.to_string()),
            item,
            group,
            can_group,
        })
    })
    .await?;
    Ok(Json(view))
}

/// Build the admin router around a shared publisher.
pub fn build_router<S: ContentStore + 'static>(publisher: SyncPublisher<S>) -> Router {
    Router::new()
        .route("/admin/remove-member", get(remove_member::<S>))
        .route("/admin/groups/{id}", get(group_view::<S>))
        .route("/api/v1/groups", get(list_groups::<S>))
        .route("/api/v1/items/{id}", get(item_view::<S>))
        .with_state(publisher)
}
