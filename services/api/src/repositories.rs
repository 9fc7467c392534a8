//! Repositories for database operations

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::middleware::AuthUser;

pub mod attribute;
pub mod recipe;

pub use attribute::AttributeRepository;
pub use recipe::RecipeRepository;

/// Read-only view of the users table
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an active user by ID
    pub async fn find_active(&self, id: Uuid) -> Result<Option<AuthUser>> {
        let user = sqlx::query_as::<_, AuthUser>(
            r#"
            SELECT id, email
            FROM users
            WHERE id = $1 AND is_active
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
