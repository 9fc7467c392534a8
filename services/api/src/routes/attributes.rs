//! Owner-scoped list and create endpoints shared by tags and ingredients

use axum::{
    Extension, Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use common::validation::{FieldErrors, max_length, required_text};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{AttributeQuery, AttributeRequest, RecipeAttribute},
    state::AppState,
};

/// List the authenticated user's tags or ingredients
pub async fn list_attributes<T: RecipeAttribute>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<AttributeQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;

    let rows = state
        .attributes::<T>()
        .list_for_user(user.id, query.assigned_only())
        .await
        .map_err(|e| ApiError::internal(&format!("Failed to list {}", T::TABLE), e))?;

    Ok(Json(rows))
}

/// Create a tag or ingredient owned by the authenticated user
pub async fn create_attribute<T: RecipeAttribute>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<AttributeRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;

    let mut errors = FieldErrors::new();
    let name = required_text(&mut errors, "name", payload.name.as_deref());
    if let Some(name) = name {
        errors.check("name", max_length(name, 255));
    }
    let Some(name) = name.filter(|_| errors.is_empty()) else {
        return Err(errors.into());
    };

    let row = state
        .attributes::<T>()
        .create(user.id, name)
        .await
        .map_err(|e| ApiError::internal(&format!("Failed to create {} row", T::TABLE), e))?;

    info!("Created {} for user {}", row, user.email);

    Ok((StatusCode::CREATED, Json(row)))
}
