//! Authentication middleware for bearer token validation

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone, FromRow)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Authentication middleware
///
/// Rejects the request with 401 unless it carries a valid bearer token for
/// an active user, then exposes that user as an [`AuthUser`] extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(ApiError::Unauthorized)?;

    let claims = state
        .jwt_service
        .validate_token(bearer.token())
        .map_err(|e| {
            warn!("Failed to validate token: {}", e);
            ApiError::Unauthorized
        })?;

    let user = state
        .user_repository
        .find_active(claims.sub)
        .await
        .map_err(|e| ApiError::internal("Failed to load user", e))?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
