//! API service routes

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    AppState,
    middleware::auth_middleware,
    models::{Ingredient, Tag},
    storage::MAX_UPLOAD_SIZE,
};

pub mod attributes;
pub mod recipes;

/// Room for multipart boundaries and headers around the image itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/api/recipe/tags/",
            get(attributes::list_attributes::<Tag>).post(attributes::create_attribute::<Tag>),
        )
        .route(
            "/api/recipe/ingredients/",
            get(attributes::list_attributes::<Ingredient>)
                .post(attributes::create_attribute::<Ingredient>),
        )
        .route(
            "/api/recipe/recipes/",
            get(recipes::list_recipes).post(recipes::create_recipe),
        )
        .route(
            "/api/recipe/recipes/:id/",
            get(recipes::get_recipe)
                .put(recipes::update_recipe)
                .patch(recipes::partial_update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route(
            "/api/recipe/recipes/:id/upload-image/",
            post(recipes::upload_image)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + MULTIPART_OVERHEAD)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let media = ServeDir::new(state.storage.root());

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .nest_service(state.storage.url_prefix(), media)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}
