//! Tags and ingredients: named, user-owned labels attached to recipes

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, postgres::PgRow};
use std::fmt;
use uuid::Uuid;

/// A user-owned attribute that recipes link to through a join table
pub trait RecipeAttribute:
    for<'r> FromRow<'r, PgRow> + Serialize + fmt::Display + Send + Sync + Unpin + 'static
{
    /// Table holding rows of this kind
    const TABLE: &'static str;
    /// Join table linking recipes to this kind
    const LINK_TABLE: &'static str;
    /// Column of the join table referencing [`Self::TABLE`]
    const LINK_COLUMN: &'static str;
    /// Name of the recipe field carrying ids of this kind
    const RECIPE_FIELD: &'static str;
}

/// Tag entity
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Tag {
    pub id: Uuid,
    #[serde(skip)]
    pub user_id: Uuid,
    pub name: String,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl RecipeAttribute for Tag {
    const TABLE: &'static str = "tags";
    const LINK_TABLE: &'static str = "recipe_tags";
    const LINK_COLUMN: &'static str = "tag_id";
    const RECIPE_FIELD: &'static str = "tags";
}

/// Ingredient entity
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Ingredient {
    pub id: Uuid,
    #[serde(skip)]
    pub user_id: Uuid,
    pub name: String,
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl RecipeAttribute for Ingredient {
    const TABLE: &'static str = "ingredients";
    const LINK_TABLE: &'static str = "recipe_ingredients";
    const LINK_COLUMN: &'static str = "ingredient_id";
    const RECIPE_FIELD: &'static str = "ingredients";
}

/// Request body for creating a tag or ingredient
#[derive(Debug, Deserialize)]
pub struct AttributeRequest {
    pub name: Option<String>,
}

/// Query parameters for listing tags or ingredients
#[derive(Debug, Default, Deserialize)]
pub struct AttributeQuery {
    /// Only return rows linked to at least one recipe ("1" or "true")
    pub assigned_only: Option<String>,
}

impl AttributeQuery {
    pub fn assigned_only(&self) -> bool {
        matches!(self.assigned_only.as_deref(), Some("1") | Some("true"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_str() {
        let tag = Tag {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Vegan".to_string(),
        };
        assert_eq!(tag.to_string(), tag.name);
    }

    #[test]
    fn test_ingredient_str() {
        let ingredient = Ingredient {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Cucumber".to_string(),
        };
        assert_eq!(ingredient.to_string(), ingredient.name);
    }

    #[test]
    fn test_owner_is_not_serialized() {
        let tag = Tag {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Dessert".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&tag).unwrap(),
            serde_json::json!({"id": tag.id, "name": "Dessert"})
        );
    }

    #[test]
    fn test_assigned_only_flag() {
        let query = |value: Option<&str>| AttributeQuery {
            assigned_only: value.map(str::to_string),
        };
        assert!(query(Some("1")).assigned_only());
        assert!(query(Some("true")).assigned_only());
        assert!(!query(Some("0")).assigned_only());
        assert!(!query(None).assigned_only());
    }
}
