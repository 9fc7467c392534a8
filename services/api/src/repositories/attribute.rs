//! Repository for tags and ingredients

use anyhow::Result;
use sqlx::PgPool;
use std::marker::PhantomData;
use tracing::info;
use uuid::Uuid;

use crate::models::RecipeAttribute;

/// Owner-scoped access to one kind of recipe attribute
pub struct AttributeRepository<T> {
    pool: PgPool,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Clone for AttributeRepository<T> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<T> AttributeRepository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _kind: PhantomData,
        }
    }
}

impl<T: RecipeAttribute> AttributeRepository<T> {
    /// List the user's rows, newest name first
    ///
    /// With `assigned_only`, rows not linked to any recipe are skipped.
    pub async fn list_for_user(&self, user_id: Uuid, assigned_only: bool) -> Result<Vec<T>> {
        let rows = sqlx::query_as::<_, T>(&format!(
            r#"
            SELECT a.id, a.user_id, a.name
            FROM {table} a
            WHERE a.user_id = $1
              AND (NOT $2 OR EXISTS (
                  SELECT 1 FROM {link} l WHERE l.{column} = a.id
              ))
            ORDER BY a.name DESC, a.created_at DESC
            "#,
            table = T::TABLE,
            link = T::LINK_TABLE,
            column = T::LINK_COLUMN,
        ))
        .bind(user_id)
        .bind(assigned_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Insert a row owned by `user_id`
    pub async fn create(&self, user_id: Uuid, name: &str) -> Result<T> {
        info!("Creating {} row for user {}", T::TABLE, user_id);

        let row = sqlx::query_as::<_, T>(&format!(
            r#"
            INSERT INTO {table} (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name
            "#,
            table = T::TABLE,
        ))
        .bind(user_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Return those of `ids` that exist and belong to `user_id`
    pub async fn find_owned_ids(&self, user_id: Uuid, ids: &[Uuid]) -> Result<Vec<Uuid>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let owned = sqlx::query_scalar::<_, Uuid>(&format!(
            "SELECT id FROM {table} WHERE user_id = $1 AND id = ANY($2)",
            table = T::TABLE,
        ))
        .bind(user_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(owned)
    }

    /// Rows linked to a recipe
    pub async fn list_for_recipe(&self, recipe_id: Uuid) -> Result<Vec<T>> {
        let rows = sqlx::query_as::<_, T>(&format!(
            r#"
            SELECT a.id, a.user_id, a.name
            FROM {table} a
            JOIN {link} l ON l.{column} = a.id
            WHERE l.recipe_id = $1
            ORDER BY a.name DESC
            "#,
            table = T::TABLE,
            link = T::LINK_TABLE,
            column = T::LINK_COLUMN,
        ))
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
