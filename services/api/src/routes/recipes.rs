//! Recipe endpoints

use axum::{
    Extension, Json,
    extract::{
        Multipart, Path, Query, State,
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use common::validation::FieldErrors;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{
        Ingredient, Recipe, RecipeAttribute, RecipeDetailResponse,
        RecipeImageResponse, RecipeQuery, RecipeRequest, RecipeResponse, Tag,
    },
    state::AppState,
    storage::{MAX_UPLOAD_SIZE, StorageError},
};

/// List the authenticated user's recipes
pub async fn list_recipes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<RecipeQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    let filter = query.parse()?;

    let recipes = state
        .recipe_repository
        .list_for_user(user.id, &filter)
        .await
        .map_err(|e| ApiError::internal("Failed to list recipes", e))?;

    let ids: Vec<Uuid> = recipes.iter().map(|recipe| recipe.id).collect();
    let mut links = state
        .recipe_repository
        .links_for(&ids)
        .await
        .map_err(|e| ApiError::internal("Failed to load recipe links", e))?;

    let response: Vec<RecipeResponse> = recipes
        .iter()
        .map(|recipe| RecipeResponse::new(recipe, links.remove(&recipe.id).unwrap_or_default()))
        .collect();

    Ok(Json(response))
}

/// Create a recipe owned by the authenticated user
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<RecipeRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let new_recipe = payload.validate_new()?;
    check_relations(
        &state,
        &user,
        Some(new_recipe.tags.as_slice()),
        Some(new_recipe.ingredients.as_slice()),
    )
    .await?;

    let recipe = state
        .recipe_repository
        .create(user.id, &new_recipe)
        .await
        .map_err(|e| ApiError::internal("Failed to create recipe", e))?;

    info!("Created recipe {} for user {}", recipe.id, user.id);

    Ok((StatusCode::CREATED, Json(list_response(&state, &recipe).await?)))
}

/// Retrieve one recipe with its tags and ingredients inlined
pub async fn get_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    let recipe = find_recipe(&state, &user, id).await?;

    let tags = state
        .attributes::<Tag>()
        .list_for_recipe(recipe.id)
        .await
        .map_err(|e| ApiError::internal("Failed to load recipe tags", e))?;
    let ingredients = state
        .attributes::<Ingredient>()
        .list_for_recipe(recipe.id)
        .await
        .map_err(|e| ApiError::internal("Failed to load recipe ingredients", e))?;
    let image = recipe.image.as_deref().map(|path| state.storage.url(path));

    Ok(Json(RecipeDetailResponse::new(
        &recipe,
        tags,
        ingredients,
        image,
    )))
}

/// Replace a recipe's fields
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RecipeRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    apply_update(&state, &user, id, payload, false).await
}

/// Update the provided fields of a recipe
pub async fn partial_update_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RecipeRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    apply_update(&state, &user, id, payload, true).await
}

async fn apply_update(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: RecipeRequest,
    partial: bool,
) -> ApiResult<Json<RecipeResponse>> {
    // Ownership is checked before validation so foreign recipes stay invisible
    find_recipe(state, user, id).await?;

    let changes = payload.validate(partial)?;
    check_relations(
        state,
        user,
        changes.tags.as_deref(),
        changes.ingredients.as_deref(),
    )
    .await?;

    let recipe = state
        .recipe_repository
        .update(user.id, id, &changes)
        .await
        .map_err(|e| ApiError::internal("Failed to update recipe", e))?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(list_response(state, &recipe).await?))
}

/// Delete a recipe and its stored image
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;

    let recipe = state
        .recipe_repository
        .delete(user.id, id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete recipe", e))?
        .ok_or(ApiError::NotFound)?;

    if let Some(image) = recipe.image.as_deref() {
        if let Err(e) = state.storage.remove(image).await {
            warn!("Failed to remove image of deleted recipe {}: {}", recipe.id, e);
        }
    }

    info!("Deleted recipe {}", recipe.id);

    Ok(StatusCode::NO_CONTENT)
}

/// Attach an image to a recipe from the multipart field `image`
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    let recipe = find_recipe(&state, &user, id).await?;
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("image") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) = match upload {
        Some((filename, data)) if !data.is_empty() => (filename, data),
        Some(_) => {
            return Err(FieldErrors::single("image", "The submitted file is empty.").into());
        }
        None => {
            return Err(FieldErrors::single("image", "No file was submitted.").into());
        }
    };
    if data.len() > MAX_UPLOAD_SIZE {
        return Err(ApiError::PayloadTooLarge);
    }

    let path = state
        .storage
        .save_recipe_image(&filename, &data)
        .await
        .map_err(|e| match e {
            StorageError::InvalidImage | StorageError::InvalidExtension { .. } => {
                ApiError::Validation(FieldErrors::single("image", e.to_string()))
            }
            e => ApiError::internal("Failed to store recipe image", e),
        })?;

    let updated = match state
        .recipe_repository
        .set_image(user.id, recipe.id, &path)
        .await
    {
        Ok(Some(updated)) => updated,
        result => {
            discard_upload(&state, &path).await;
            return Err(match result {
                Err(e) => ApiError::internal("Failed to save recipe image", e),
                _ => ApiError::NotFound,
            });
        }
    };

    if let Some(previous) = recipe.image.as_deref() {
        if let Err(e) = state.storage.remove(previous).await {
            warn!("Failed to remove previous image {}: {}", previous, e);
        }
    }

    info!("Uploaded image for recipe {}", updated.id);

    Ok(Json(RecipeImageResponse {
        id: updated.id,
        image: updated.image.as_deref().map(|path| state.storage.url(path)),
    }))
}

/// Remove a stored file that no recipe ended up referencing
async fn discard_upload(state: &AppState, path: &str) {
    if let Err(e) = state.storage.remove(path).await {
        warn!("Failed to remove orphaned image {}: {}", path, e);
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(e.body_text())
    }
}

async fn find_recipe(state: &AppState, user: &AuthUser, id: Uuid) -> ApiResult<Recipe> {
    state
        .recipe_repository
        .find_for_user(user.id, id)
        .await
        .map_err(|e| ApiError::internal("Failed to load recipe", e))?
        .ok_or(ApiError::NotFound)
}

async fn list_response(state: &AppState, recipe: &Recipe) -> ApiResult<RecipeResponse> {
    let mut links = state
        .recipe_repository
        .links_for(&[recipe.id])
        .await
        .map_err(|e| ApiError::internal("Failed to load recipe links", e))?;

    Ok(RecipeResponse::new(
        recipe,
        links.remove(&recipe.id).unwrap_or_default(),
    ))
}

/// Reject tag or ingredient ids the user does not own
async fn check_relations(
    state: &AppState,
    user: &AuthUser,
    tags: Option<&[Uuid]>,
    ingredients: Option<&[Uuid]>,
) -> ApiResult<()> {
    let mut errors = FieldErrors::new();
    if let Some(ids) = tags {
        check_owned::<Tag>(state, user, ids, &mut errors).await?;
    }
    if let Some(ids) = ingredients {
        check_owned::<Ingredient>(state, user, ids, &mut errors).await?;
    }
    errors.into_result().map_err(ApiError::from)
}

async fn check_owned<T: RecipeAttribute>(
    state: &AppState,
    user: &AuthUser,
    ids: &[Uuid],
    errors: &mut FieldErrors,
) -> ApiResult<()> {
    let owned = state
        .attributes::<T>()
        .find_owned_ids(user.id, ids)
        .await
        .map_err(|e| ApiError::internal(&format!("Failed to check {}", T::TABLE), e))?;

    for id in ids.iter().filter(|id| !owned.contains(*id)) {
        errors.add(
            T::RECIPE_FIELD,
            format!("Invalid pk \"{}\" - object does not exist.", id),
        );
    }
    Ok(())
}
