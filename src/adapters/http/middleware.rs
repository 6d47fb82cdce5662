use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{actor::Actor, adapters::http::app_state::AppState, app_error::AppError, jwt};

/// Verifies the bearer token and makes the caller available as an `Actor`
/// request extension.
pub async fn require_auth(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or(AppError::Unauthorized)?;
    let claims = jwt::verify(token, &app_state.config.jwt_secret)?;

    let actor = Actor {
        user_id: claims.user_id()?,
        club_id: claims.club_id()?,
        role: claims.role,
    };

    tracing::debug!(user_id = %actor.user_id, club_id = %actor.club_id, "Authenticated request");

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

fn bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}
