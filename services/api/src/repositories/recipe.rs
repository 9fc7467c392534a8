//! Recipe repository for database operations

use anyhow::Result;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    Ingredient, NewRecipe, Recipe, RecipeAttribute, RecipeChanges, RecipeFilter, RecipeLinks, Tag,
};

const RECIPE_COLUMNS: &str =
    "id, user_id, title, time_minutes, price, link, image, created_at, updated_at";

/// Recipe repository
#[derive(Clone)]
pub struct RecipeRepository {
    pool: PgPool,
}

impl RecipeRepository {
    /// Create a new recipe repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List the user's recipes, newest first
    ///
    /// A recipe matches a filter when it links to any of the given ids.
    pub async fn list_for_user(&self, user_id: Uuid, filter: &RecipeFilter) -> Result<Vec<Recipe>> {
        let recipes = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            SELECT {RECIPE_COLUMNS}
            FROM recipes r
            WHERE r.user_id = $1
              AND ($2::uuid[] IS NULL OR EXISTS (
                  SELECT 1 FROM recipe_tags rt
                  WHERE rt.recipe_id = r.id AND rt.tag_id = ANY($2)
              ))
              AND ($3::uuid[] IS NULL OR EXISTS (
                  SELECT 1 FROM recipe_ingredients ri
                  WHERE ri.recipe_id = r.id AND ri.ingredient_id = ANY($3)
              ))
            ORDER BY r.created_at DESC
            "#
        ))
        .bind(user_id)
        .bind(filter.tags.as_deref())
        .bind(filter.ingredients.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(recipes)
    }

    /// Find a recipe owned by `user_id`
    pub async fn find_for_user(&self, user_id: Uuid, id: Uuid) -> Result<Option<Recipe>> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(recipe)
    }

    /// Insert a recipe and its links in one transaction
    pub async fn create(&self, user_id: Uuid, new_recipe: &NewRecipe) -> Result<Recipe> {
        info!("Creating recipe for user {}", user_id);

        let mut tx = self.pool.begin().await?;

        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            INSERT INTO recipes (user_id, title, time_minutes, price, link)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&new_recipe.title)
        .bind(new_recipe.time_minutes)
        .bind(new_recipe.price)
        .bind(&new_recipe.link)
        .fetch_one(&mut *tx)
        .await?;

        link::<Tag>(&mut tx, recipe.id, user_id, &new_recipe.tags).await?;
        link::<Ingredient>(&mut tx, recipe.id, user_id, &new_recipe.ingredients).await?;

        tx.commit().await?;

        Ok(recipe)
    }

    /// Apply the provided changes to a recipe owned by `user_id`
    ///
    /// Present relation lists replace the stored links wholesale.
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: &RecipeChanges,
    ) -> Result<Option<Recipe>> {
        info!("Updating recipe {}", id);

        let mut tx = self.pool.begin().await?;

        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            UPDATE recipes
            SET title = COALESCE($3, title),
                time_minutes = COALESCE($4, time_minutes),
                price = COALESCE($5, price),
                link = COALESCE($6, link),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(changes.title.as_deref())
        .bind(changes.time_minutes)
        .bind(changes.price)
        .bind(changes.link.as_deref())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(recipe) = recipe else {
            return Ok(None);
        };

        if let Some(tags) = &changes.tags {
            unlink::<Tag>(&mut tx, recipe.id).await?;
            link::<Tag>(&mut tx, recipe.id, user_id, tags).await?;
        }
        if let Some(ingredients) = &changes.ingredients {
            unlink::<Ingredient>(&mut tx, recipe.id).await?;
            link::<Ingredient>(&mut tx, recipe.id, user_id, ingredients).await?;
        }

        tx.commit().await?;

        Ok(Some(recipe))
    }

    /// Delete a recipe owned by `user_id`, returning the deleted row
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<Option<Recipe>> {
        info!("Deleting recipe {}", id);

        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            "DELETE FROM recipes WHERE id = $1 AND user_id = $2 RETURNING {RECIPE_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(recipe)
    }

    /// Store the image path of a recipe owned by `user_id`
    pub async fn set_image(&self, user_id: Uuid, id: Uuid, image: &str) -> Result<Option<Recipe>> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            UPDATE recipes
            SET image = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(image)
        .fetch_optional(&self.pool)
        .await?;

        Ok(recipe)
    }

    /// Tag and ingredient ids linked to each of the given recipes
    pub async fn links_for(&self, recipe_ids: &[Uuid]) -> Result<HashMap<Uuid, RecipeLinks>> {
        let mut links: HashMap<Uuid, RecipeLinks> = HashMap::new();
        if recipe_ids.is_empty() {
            return Ok(links);
        }

        for (recipe_id, tag_id) in linked_ids::<Tag>(&self.pool, recipe_ids).await? {
            links.entry(recipe_id).or_default().tags.push(tag_id);
        }
        for (recipe_id, ingredient_id) in linked_ids::<Ingredient>(&self.pool, recipe_ids).await? {
            links
                .entry(recipe_id)
                .or_default()
                .ingredients
                .push(ingredient_id);
        }

        Ok(links)
    }
}

async fn linked_ids<T: RecipeAttribute>(
    pool: &PgPool,
    recipe_ids: &[Uuid],
) -> Result<Vec<(Uuid, Uuid)>> {
    let rows = sqlx::query_as::<_, (Uuid, Uuid)>(&format!(
        r#"
        SELECT l.recipe_id, a.id
        FROM {link} l
        JOIN {table} a ON a.id = l.{column}
        WHERE l.recipe_id = ANY($1)
        ORDER BY a.name DESC
        "#,
        table = T::TABLE,
        link = T::LINK_TABLE,
        column = T::LINK_COLUMN,
    ))
    .bind(recipe_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Link a recipe to those of `ids` owned by `user_id`
async fn link<T: RecipeAttribute>(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    user_id: Uuid,
    ids: &[Uuid],
) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }

    sqlx::query(&format!(
        r#"
        INSERT INTO {link} (recipe_id, {column})
        SELECT $1, a.id FROM {table} a
        WHERE a.id = ANY($2) AND a.user_id = $3
        ON CONFLICT DO NOTHING
        "#,
        table = T::TABLE,
        link = T::LINK_TABLE,
        column = T::LINK_COLUMN,
    ))
    .bind(recipe_id)
    .bind(ids)
    .bind(user_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn unlink<T: RecipeAttribute>(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
) -> Result<()> {
    sqlx::query(&format!(
        "DELETE FROM {link} WHERE recipe_id = $1",
        link = T::LINK_TABLE,
    ))
    .bind(recipe_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
