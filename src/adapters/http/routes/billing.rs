use axum::{
    Extension, Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{actor::Actor, adapters::http::app_state::AppState, app_error::AppResult};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/run", post(run_billing))
        .route("/last-run", get(last_run))
}

/// Trigger a billing run now. Safe to call while the scheduler is running.
///
/// The run covers every club; the response only carries the caller's club.
async fn run_billing(
    State(app_state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> AppResult<impl IntoResponse> {
    actor.require_admin()?;
    tracing::info!(user_id = %actor.user_id, "Manual billing run requested");

    let report = app_state.billing_use_cases.process_recurring_payments().await?;
    let overdue = app_state.billing_use_cases.mark_overdue_payments().await?;

    Ok(Json(serde_json::json!({
        "report": report.for_club(actor.club_id),
        "overdue_marked": overdue,
    })))
}

async fn last_run(
    State(app_state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> AppResult<impl IntoResponse> {
    actor.require_admin()?;
    let report = app_state
        .billing_use_cases
        .last_report()
        .map(|report| report.for_club(actor.club_id));
    Ok(Json(report))
}
