//! API models for request and response payloads

pub mod attribute;
pub mod recipe;

pub use attribute::{AttributeQuery, AttributeRequest, Ingredient, RecipeAttribute, Tag};
pub use recipe::{
    NewRecipe, Recipe, RecipeChanges, RecipeDetailResponse, RecipeFilter, RecipeImageResponse,
    RecipeLinks, RecipeQuery, RecipeRequest, RecipeResponse,
};
