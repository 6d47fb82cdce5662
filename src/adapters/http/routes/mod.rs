pub mod billing;
pub mod notifications;
pub mod payments;
pub mod plans;
pub mod player_plans;

use axum::Router;

use crate::adapters::http::app_state::AppState;

/// Authenticated API routes. The caller layers `require_auth` on top.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/plans", plans::router())
        .nest("/player-plans", player_plans::router())
        .nest("/payments", payments::router())
        .nest("/notifications", notifications::router())
        .nest("/billing", billing::router())
}
