use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{actor::Actor, adapters::http::app_state::AppState, app_error::AppResult};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/{notification_id}/read", post(mark_read))
}

#[derive(Debug, Default, Deserialize)]
struct ListNotificationsQuery {
    #[serde(default)]
    unread_only: bool,
}

async fn list_notifications(
    State(app_state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListNotificationsQuery>,
) -> AppResult<impl IntoResponse> {
    let notifications = app_state
        .notification_use_cases
        .list(actor.user_id, query.unread_only)
        .await?;
    Ok(Json(notifications))
}

async fn unread_count(
    State(app_state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> AppResult<impl IntoResponse> {
    let count = app_state
        .notification_use_cases
        .unread_count(actor.user_id)
        .await?;
    Ok(Json(serde_json::json!({ "count": count })))
}

async fn mark_read(
    State(app_state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(notification_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    app_state
        .notification_use_cases
        .mark_read(actor.user_id, notification_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn mark_all_read(
    State(app_state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> AppResult<impl IntoResponse> {
    let updated = app_state
        .notification_use_cases
        .mark_all_read(actor.user_id)
        .await?;
    Ok(Json(serde_json::json!({ "updated": updated })))
}
