use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    actor::Actor, adapters::http::app_state::AppState, app_error::AppResult,
    domain::entities::payment_status::PaymentStatus, use_cases::payment::ManualPaymentRequest,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments).post(create_payment))
        .route("/{payment_id}/mark-paid", post(mark_paid))
}

#[derive(Debug, Default, Deserialize)]
struct ListPaymentsQuery {
    status: Option<PaymentStatus>,
}

async fn list_payments(
    State(app_state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListPaymentsQuery>,
) -> AppResult<impl IntoResponse> {
    let payments = app_state
        .payment_use_cases
        .list_payments(&actor, query.status)
        .await?;
    Ok(Json(payments))
}

async fn create_payment(
    State(app_state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<ManualPaymentRequest>,
) -> AppResult<impl IntoResponse> {
    let payment = app_state
        .payment_use_cases
        .create_manual_payment(&actor, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

async fn mark_paid(
    State(app_state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(payment_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let payment = app_state
        .payment_use_cases
        .mark_paid(&actor, payment_id)
        .await?;
    Ok(Json(payment))
}
