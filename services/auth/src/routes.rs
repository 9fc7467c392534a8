//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use common::validation::{FieldErrors, REQUIRED, required_text};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    error::{AuthError, AuthResult},
    middleware::auth_middleware,
    models::{
        CreateUserRequest, NewUser, TokenRequest, TokenResponse, UpdateProfileRequest, UpdateUser,
        User, UserError, UserResponse, normalize_email,
    },
    password::hash_password,
    state::AppState,
    validation::{validate_email, validate_name, validate_password},
};

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/api/user/me/",
            get(get_profile).put(replace_profile).patch(update_profile),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/user/create/", post(create_user))
        .route("/api/user/token/", post(create_token))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// Register a new user
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let (email, password, name) = validate_registration(&payload)?;

    let new_user = NewUser::new(Some(email), password, name).map_err(|e| match e {
        UserError::MissingEmail => AuthError::Validation(FieldErrors::single("email", REQUIRED)),
        UserError::PasswordHash(msg) => {
            error!("Failed to hash password: {}", msg);
            AuthError::InternalServerError
        }
    })?;

    let user = state
        .user_repository
        .create(&new_user)
        .await
        .map_err(|e| {
            error!("Failed to create user: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or_else(|| {
            AuthError::Validation(FieldErrors::single(
                "email",
                "user with this email already exists.",
            ))
        })?;

    info!("Registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

fn validate_registration(
    payload: &CreateUserRequest,
) -> Result<(&str, &str, &str), FieldErrors> {
    let mut errors = FieldErrors::new();

    let email = required_text(&mut errors, "email", payload.email.as_deref());
    if let Some(email) = email {
        errors.check("email", validate_email(email));
    }

    let password = payload.password.as_deref();
    match password {
        Some(password) => errors.check("password", validate_password(password)),
        None => errors.add("password", REQUIRED),
    }

    let name = payload.name.as_deref().map(str::trim).unwrap_or_default();
    errors.check("name", validate_name(name));

    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => Ok((email, password, name)),
        _ => Err(errors),
    }
}

/// Exchange email and password for a bearer token
pub async fn create_token(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(payload) = payload?;

    let mut errors = FieldErrors::new();
    let email = required_text(&mut errors, "email", payload.email.as_deref());
    let password = match payload.password.as_deref() {
        Some(password) if !password.is_empty() => Some(password),
        _ => {
            errors.add("password", REQUIRED);
            None
        }
    };
    let (Some(email), Some(password)) = (email, password) else {
        return Err(errors.into());
    };

    let key = normalize_email(email);
    if !state.rate_limiter.is_allowed(&key).await {
        return Err(AuthError::TooManyRequests);
    }

    let user = state
        .user_repository
        .find_by_email(&key)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AuthError::InternalServerError
        })?
        .filter(|user| user.is_active && user.check_password(password))
        .ok_or_else(|| AuthError::non_field("Unable to authenticate with provided credentials"))?;

    state.rate_limiter.reset(&key).await;

    let token = state
        .jwt_service
        .generate_access_token(user.id)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            AuthError::InternalServerError
        })?;

    info!("Issued token for user {}", user.id);

    Ok(Json(TokenResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    }))
}

/// Return the authenticated user's profile
pub async fn get_profile(Extension(user): Extension<User>) -> impl IntoResponse {
    Json(UserResponse::from(&user))
}

/// Partially update the authenticated user's profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(payload) = payload?;
    apply_profile_update(&state, &user, payload, true).await
}

/// Replace the authenticated user's name and password
pub async fn replace_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(payload) = payload?;
    apply_profile_update(&state, &user, payload, false).await
}

async fn apply_profile_update(
    state: &AppState,
    user: &User,
    payload: UpdateProfileRequest,
    partial: bool,
) -> AuthResult<Json<UserResponse>> {
    let mut errors = FieldErrors::new();

    let name = payload.name.as_deref().map(str::trim);
    match name {
        Some(name) => errors.check("name", validate_name(name)),
        None if !partial => errors.add("name", REQUIRED),
        None => {}
    }

    match payload.password.as_deref() {
        Some(password) => errors.check("password", validate_password(password)),
        None if !partial => errors.add("password", REQUIRED),
        None => {}
    }

    errors.into_result()?;

    let password_hash = payload
        .password
        .as_deref()
        .map(hash_password)
        .transpose()
        .map_err(|e| {
            error!("Failed to hash password: {}", e);
            AuthError::InternalServerError
        })?;

    let changes = UpdateUser {
        name: name.map(str::to_string),
        password_hash,
    };

    let updated = state
        .user_repository
        .update(user.id, &changes)
        .await
        .map_err(|e| {
            error!("Failed to update user {}: {}", user.id, e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::Unauthorized)?;

    Ok(Json(UserResponse::from(&updated)))
}
