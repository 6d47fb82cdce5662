use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    actor::Actor, adapters::http::app_state::AppState, app_error::AppResult,
    use_cases::player_plan::SubscribeRequest,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_player_plans).post(subscribe))
        .route("/{player_plan_id}/cancel", post(cancel))
}

async fn list_player_plans(
    State(app_state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> AppResult<impl IntoResponse> {
    let player_plans = app_state.player_plan_use_cases.list(&actor).await?;
    Ok(Json(player_plans))
}

async fn subscribe(
    State(app_state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<SubscribeRequest>,
) -> AppResult<impl IntoResponse> {
    let player_plan = app_state
        .player_plan_use_cases
        .subscribe(&actor, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(player_plan)))
}

async fn cancel(
    State(app_state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(player_plan_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let player_plan = app_state
        .player_plan_use_cases
        .cancel(&actor, player_plan_id)
        .await?;
    Ok(Json(player_plan))
}
