use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    actor::Actor, adapters::http::app_state::AppState, app_error::AppResult,
    use_cases::plan::NewPlan,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_plans).post(create_plan))
        .route("/{plan_id}", get(get_plan))
}

#[derive(Debug, Default, Deserialize)]
struct ListPlansQuery {
    #[serde(default)]
    include_inactive: bool,
}

async fn list_plans(
    State(app_state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListPlansQuery>,
) -> AppResult<impl IntoResponse> {
    let plans = app_state
        .plan_use_cases
        .list_plans(&actor, query.include_inactive)
        .await?;
    Ok(Json(plans))
}

async fn create_plan(
    State(app_state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<NewPlan>,
) -> AppResult<impl IntoResponse> {
    let plan = app_state.plan_use_cases.create_plan(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn get_plan(
    State(app_state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(plan_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let plan = app_state.plan_use_cases.get_plan(&actor, plan_id).await?;
    Ok(Json(plan))
}
