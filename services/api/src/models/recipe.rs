//! Recipe models and their wire representations

use chrono::{DateTime, Utc};
use common::validation::{FieldErrors, REQUIRED, max_length, required_text};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

use super::attribute::{Ingredient, Tag};

/// Recipe entity
#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    /// Storage path of the image, relative to the media root
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Ids of the tags and ingredients linked to one recipe
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeLinks {
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<Uuid>,
}

/// Recipe representation used by list, create and update responses
#[derive(Debug, Clone, Serialize)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub title: String,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<Uuid>,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
}

impl RecipeResponse {
    pub fn new(recipe: &Recipe, links: RecipeLinks) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.clone(),
            tags: links.tags,
            ingredients: links.ingredients,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link.clone(),
        }
    }
}

/// Recipe representation with related tags and ingredients inlined
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub image: Option<String>,
}

impl RecipeDetailResponse {
    pub fn new(
        recipe: &Recipe,
        tags: Vec<Tag>,
        ingredients: Vec<Ingredient>,
        image_url: Option<String>,
    ) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.clone(),
            tags,
            ingredients,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link.clone(),
            image: image_url,
        }
    }
}

/// Response for image uploads
#[derive(Debug, Clone, Serialize)]
pub struct RecipeImageResponse {
    pub id: Uuid,
    pub image: Option<String>,
}

/// Query parameters for listing recipes
#[derive(Debug, Default, Deserialize)]
pub struct RecipeQuery {
    /// Comma separated tag ids
    pub tags: Option<String>,
    /// Comma separated ingredient ids
    pub ingredients: Option<String>,
}

/// Recipe filters with parsed ids; `None` means unfiltered
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecipeFilter {
    pub tags: Option<Vec<Uuid>>,
    pub ingredients: Option<Vec<Uuid>>,
}

impl RecipeQuery {
    pub fn parse(&self) -> Result<RecipeFilter, FieldErrors> {
        let mut errors = FieldErrors::new();
        let filter = RecipeFilter {
            tags: parse_ids(&mut errors, "tags", self.tags.as_deref()),
            ingredients: parse_ids(&mut errors, "ingredients", self.ingredients.as_deref()),
        };
        errors.into_result().map(|_| filter)
    }
}

fn parse_ids(errors: &mut FieldErrors, field: &str, raw: Option<&str>) -> Option<Vec<Uuid>> {
    let raw = raw.map(str::trim).filter(|raw| !raw.is_empty())?;

    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match Uuid::parse_str(part) {
            Ok(id) => ids.push(id),
            Err(_) => errors.add(field, format!("\"{}\" is not a valid UUID.", part)),
        }
    }
    Some(ids)
}

/// Request body for creating or updating a recipe
#[derive(Debug, Default, Deserialize)]
pub struct RecipeRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub tags: Option<Vec<Uuid>>,
    pub ingredients: Option<Vec<Uuid>>,
}

/// Validated recipe fields; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub tags: Option<Vec<Uuid>>,
    pub ingredients: Option<Vec<Uuid>>,
}

/// Fields of a recipe about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<Uuid>,
}

impl RecipeRequest {
    /// Validate the payload of an update
    ///
    /// With `partial` unset, title, time_minutes and price are required.
    pub fn validate(self, partial: bool) -> Result<RecipeChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = check_title(&mut errors, self.title, !partial);
        let time_minutes = check_time(&mut errors, self.time_minutes, !partial);
        let price = check_price(&mut errors, self.price, !partial);
        let link = check_link(&mut errors, self.link);
        errors.into_result()?;

        Ok(RecipeChanges {
            title,
            time_minutes,
            price,
            link,
            tags: self.tags.map(dedup_ids),
            ingredients: self.ingredients.map(dedup_ids),
        })
    }

    /// Validate the payload of a new recipe
    pub fn validate_new(self) -> Result<NewRecipe, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = check_title(&mut errors, self.title, true);
        let time_minutes = check_time(&mut errors, self.time_minutes, true);
        let price = check_price(&mut errors, self.price, true);
        let link = check_link(&mut errors, self.link);

        match (title, time_minutes, price) {
            (Some(title), Some(time_minutes), Some(price)) if errors.is_empty() => Ok(NewRecipe {
                title,
                time_minutes,
                price,
                link: link.unwrap_or_default(),
                tags: self.tags.map(dedup_ids).unwrap_or_default(),
                ingredients: self.ingredients.map(dedup_ids).unwrap_or_default(),
            }),
            _ => Err(errors),
        }
    }
}

fn check_title(errors: &mut FieldErrors, title: Option<String>, required: bool) -> Option<String> {
    if title.is_none() && !required {
        return None;
    }
    let title = required_text(errors, "title", title.as_deref())?;
    match max_length(title, 255) {
        Ok(()) => Some(title.to_string()),
        Err(message) => {
            errors.add("title", message);
            None
        }
    }
}

fn check_time(errors: &mut FieldErrors, minutes: Option<i32>, required: bool) -> Option<i32> {
    match minutes {
        Some(minutes) if minutes < 0 => {
            errors.add("time_minutes", "Ensure this value is greater than or equal to 0.");
            None
        }
        None if required => {
            errors.add("time_minutes", REQUIRED);
            None
        }
        minutes => minutes,
    }
}

fn check_price(errors: &mut FieldErrors, price: Option<Decimal>, required: bool) -> Option<Decimal> {
    match price {
        Some(price) => match validate_price(price) {
            Ok(()) => Some(price),
            Err(message) => {
                errors.add("price", message);
                None
            }
        },
        None => {
            if required {
                errors.add("price", REQUIRED);
            }
            None
        }
    }
}

fn check_link(errors: &mut FieldErrors, link: Option<String>) -> Option<String> {
    let link = link.map(|link| link.trim().to_string());
    if let Some(link) = link.as_deref() {
        errors.check("link", max_length(link, 255));
    }
    link
}

/// Prices are stored as NUMERIC(5, 2)
fn validate_price(price: Decimal) -> Result<(), String> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }
    if price.normalize().scale() > 2 {
        return Err("Ensure that there are no more than 2 decimal places.".to_string());
    }
    if price.trunc() >= Decimal::from(1000) {
        return Err("Ensure that there are no more than 3 digits before the decimal point.".to_string());
    }
    Ok(())
}

/// Drop repeated ids, keeping first occurrences in order
fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample_recipe() -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Steak and mushroom sauce".to_string(),
            time_minutes: 5,
            price: Decimal::from_str("5.00").unwrap(),
            link: String::new(),
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(body: serde_json::Value) -> RecipeRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_recipe_str() {
        let recipe = sample_recipe();
        assert_eq!(recipe.to_string(), recipe.title);
    }

    #[test]
    fn test_list_representation_uses_ids() {
        let recipe = sample_recipe();
        let tag = Uuid::new_v4();
        let response = RecipeResponse::new(
            &recipe,
            RecipeLinks {
                tags: vec![tag],
                ingredients: vec![],
            },
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["tags"], serde_json::json!([tag]));
        assert_eq!(json["price"], "5.00");
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_detail_representation_nests_objects() {
        let recipe = sample_recipe();
        let tag = Tag {
            id: Uuid::new_v4(),
            user_id: recipe.user_id,
            name: "Main course".to_string(),
        };
        let response = RecipeDetailResponse::new(&recipe, vec![tag.clone()], vec![], None);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json["tags"],
            serde_json::json!([{"id": tag.id, "name": "Main course"}])
        );
        assert!(json["image"].is_null());
    }

    #[test]
    fn test_full_validation_requires_fields() {
        let errors = request(serde_json::json!({})).validate(false).unwrap_err();

        assert_eq!(errors.get("title"), Some(&[REQUIRED.to_string()][..]));
        assert!(errors.get("time_minutes").is_some());
        assert!(errors.get("price").is_some());
    }

    #[test]
    fn test_partial_validation_accepts_subset() {
        let changes = request(serde_json::json!({"title": " Chicken tikka "}))
            .validate(true)
            .unwrap();

        assert_eq!(changes.title.as_deref(), Some("Chicken tikka"));
        assert_eq!(changes.price, None);
        assert_eq!(changes.tags, None);
    }

    #[test]
    fn test_blank_title_rejected_even_when_partial() {
        let errors = request(serde_json::json!({"title": ""}))
            .validate(true)
            .unwrap_err();
        assert!(errors.get("title").is_some());
    }

    #[test]
    fn test_price_limits() {
        let price = |value: &str| validate_price(Decimal::from_str(value).unwrap());

        assert!(price("5.00").is_ok());
        assert!(price("999.99").is_ok());
        assert!(price("0").is_ok());
        assert!(price("1000.00").is_err());
        assert!(price("1.005").is_err());
        assert!(price("-1.00").is_err());
    }

    #[test]
    fn test_numeric_price_accepted() {
        let changes = request(serde_json::json!({
            "title": "Chocolate cheesecake",
            "time_minutes": 30,
            "price": 5.00
        }))
        .validate(false)
        .unwrap();

        assert_eq!(changes.price, Some(Decimal::from(5)));
    }

    #[test]
    fn test_duplicate_ids_collapsed() {
        let tag = Uuid::new_v4();
        let changes = request(serde_json::json!({"tags": [tag, tag]}))
            .validate(true)
            .unwrap();
        assert_eq!(changes.tags, Some(vec![tag]));
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(dedup_ids(vec![b, a, b, c, a]), vec![b, a, c]);
    }

    #[test]
    fn test_new_recipe_defaults_relations() {
        let new_recipe = request(serde_json::json!({
            "title": "Avocado lime cheesecake",
            "time_minutes": 60,
            "price": "20.00"
        }))
        .validate_new()
        .unwrap();

        assert!(new_recipe.tags.is_empty());
        assert!(new_recipe.ingredients.is_empty());
        assert_eq!(new_recipe.link, "");
        assert_eq!(new_recipe.price, Decimal::from(20));
    }

    #[test]
    fn test_new_recipe_missing_price() {
        let errors = request(serde_json::json!({
            "title": "Avocado lime cheesecake",
            "time_minutes": 60
        }))
        .validate_new()
        .unwrap_err();

        assert_eq!(errors.get("price"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("title"), None);
    }

    #[test]
    fn test_new_recipe_reports_every_field() {
        let errors = request(serde_json::json!({
            "title": "   ",
            "time_minutes": -1,
            "price": "1.005",
            "link": "x".repeat(256)
        }))
        .validate_new()
        .unwrap_err();

        for field in ["title", "time_minutes", "price", "link"] {
            assert!(errors.get(field).is_some(), "missing error for {}", field);
        }
    }

    #[test]
    fn test_filter_parsing() {
        let tag = Uuid::new_v4();
        let query = RecipeQuery {
            tags: Some(format!("{}, ", tag)),
            ingredients: None,
        };
        assert_eq!(
            query.parse().unwrap(),
            RecipeFilter {
                tags: Some(vec![tag]),
                ingredients: None,
            }
        );

        let bad = RecipeQuery {
            tags: None,
            ingredients: Some("1,2".to_string()),
        };
        assert!(bad.parse().unwrap_err().get("ingredients").is_some());
    }
}
