//! Application state shared across handlers

use common::jwt::JwtService;
use sqlx::PgPool;

use crate::{
    models::RecipeAttribute,
    repositories::{AttributeRepository, RecipeRepository, UserRepository},
    storage::MediaStorage,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub recipe_repository: RecipeRepository,
    pub storage: MediaStorage,
}

impl AppState {
    pub fn new(db_pool: PgPool, jwt_service: JwtService, storage: MediaStorage) -> Self {
        Self {
            user_repository: UserRepository::new(db_pool.clone()),
            recipe_repository: RecipeRepository::new(db_pool.clone()),
            db_pool,
            jwt_service,
            storage,
        }
    }

    /// Repository for tags or ingredients
    pub fn attributes<T: RecipeAttribute>(&self) -> AttributeRepository<T> {
        AttributeRepository::new(self.db_pool.clone())
    }
}
