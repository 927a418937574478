use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Meal payload as submitted by clients.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MealIn {
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strCategory", default)]
    pub category: Option<String>,
    #[serde(rename = "strArea", default)]
    pub area: Option<String>,
    #[serde(rename = "strInstructions")]
    pub instructions: String,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,
    #[serde(rename = "strTags", default)]
    pub tags: Option<String>,
    #[serde(rename = "strYoutube", default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub measures: Vec<String>,
}

impl MealIn {
    /// Checks the mandatory fields and that every ingredient has a measure.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::InvalidInput("strMeal must not be empty".to_string()));
        }
        if self.instructions.trim().is_empty() {
            return Err(AppError::InvalidInput("strInstructions must not be empty".to_string()));
        }
        if self.ingredients.len() != self.measures.len() {
            return Err(AppError::InvalidInput(format!(
                "ingredients and measures must have the same length (got {} and {})",
                self.ingredients.len(),
                self.measures.len()
            )));
        }
        Ok(())
    }
}

/// A `MealIn` bound to the user that owns it, ready to persist.
#[derive(Debug, Clone)]
pub struct MealBroker {
    pub meal: MealIn,
    pub user_id: Uuid,
}

impl MealBroker {
    pub fn new(meal: MealIn, user_id: Uuid) -> Self {
        Self { meal, user_id }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Meal {
    pub id: i32,
    #[serde(rename = "strMeal")]
    #[sqlx(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strCategory")]
    #[sqlx(rename = "strCategory")]
    pub category: Option<String>,
    #[serde(rename = "strArea")]
    #[sqlx(rename = "strArea")]
    pub area: Option<String>,
    #[serde(rename = "strInstructions")]
    #[sqlx(rename = "strInstructions")]
    pub instructions: String,
    #[serde(rename = "strMealThumb")]
    #[sqlx(rename = "strMealThumb")]
    pub thumbnail: Option<String>,
    #[serde(rename = "strTags")]
    #[sqlx(rename = "strTags")]
    pub tags: Option<String>,
    #[serde(rename = "strYoutube")]
    #[sqlx(rename = "strYoutube")]
    pub video_url: Option<String>,
    pub ingredients: Vec<String>,
    pub measures: Vec<String>,
    pub user_id: Uuid,
}

impl Meal {
    pub fn from_broker(id: i32, broker: MealBroker) -> Self {
        let MealBroker { meal, user_id } = broker;
        Self {
            id,
            name: meal.name,
            category: meal.category,
            area: meal.area,
            instructions: meal.instructions,
            thumbnail: meal.thumbnail,
            tags: meal.tags,
            video_url: meal.video_url,
            ingredients: meal.ingredients,
            measures: meal.measures,
            user_id,
        }
    }
}

/// Meal fields without the id and owner; the recommendation payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MealSummary {
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strCategory")]
    pub category: Option<String>,
    #[serde(rename = "strArea")]
    pub area: Option<String>,
    #[serde(rename = "strInstructions")]
    pub instructions: String,
    #[serde(rename = "strMealThumb")]
    pub thumbnail: Option<String>,
    #[serde(rename = "strTags")]
    pub tags: Option<String>,
    #[serde(rename = "strYoutube")]
    pub video_url: Option<String>,
    pub ingredients: Vec<String>,
    pub measures: Vec<String>,
}

impl From<Meal> for MealSummary {
    fn from(meal: Meal) -> Self {
        Self {
            name: meal.name,
            category: meal.category,
            area: meal.area,
            instructions: meal.instructions,
            thumbnail: meal.thumbnail,
            tags: meal.tags,
            video_url: meal.video_url,
            ingredients: meal.ingredients,
            measures: meal.measures,
        }
    }
}

/// Stored user row. Carries the password hash, so it never leaves the service layer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
    pub favourites: Vec<i32>,
}

/// Credentials submitted for registration and login.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserIn {
    pub email: String,
    pub password: String,
}

impl UserIn {
    pub fn validate(&self) -> Result<(), AppError> {
        let email = self.email.trim();
        let valid_email = match email.split_once('@') {
            Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'),
            None => false,
        };
        if !valid_email {
            return Err(AppError::InvalidInput(format!("Invalid e-mail address: {}", self.email)));
        }
        if self.password.is_empty() {
            return Err(AppError::InvalidInput("Password must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self { id: user.id, email: user.email }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenDto {
    pub token_type: String,
    pub user_token: String,
    pub expires: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal_in(ingredients: &[&str], measures: &[&str]) -> MealIn {
        MealIn {
            name: "Soup".into(),
            category: None,
            area: None,
            instructions: "Boil.".into(),
            thumbnail: None,
            tags: None,
            video_url: None,
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            measures: measures.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn meal_in_requires_parallel_ingredients_and_measures() {
        assert!(meal_in(&["Salt", "Water"], &["1 tsp", "1 l"]).validate().is_ok());
        let err = meal_in(&["Salt", "Water"], &["1 tsp"]).validate().unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn meal_in_rejects_blank_name() {
        let mut meal = meal_in(&[], &[]);
        meal.name = "   ".into();
        assert!(matches!(meal.validate(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn meal_in_accepts_original_wire_names() {
        let meal: MealIn = serde_json::from_value(serde_json::json!({
            "strMeal": "Stew",
            "strInstructions": "Simmer for two hours.",
            "strArea": "Irish",
        }))
        .unwrap();
        assert_eq!(meal.name, "Stew");
        assert_eq!(meal.area.as_deref(), Some("Irish"));
        assert!(meal.ingredients.is_empty());
        assert!(meal.category.is_none());
    }

    #[test]
    fn user_in_validates_email_shape() {
        let ok = UserIn { email: "cook@example.com".into(), password: "secret".into() };
        assert!(ok.validate().is_ok());
        for email in ["", "cook", "@example.com", "cook@example", "cook@.com"] {
            let bad = UserIn { email: email.into(), password: "secret".into() };
            assert!(bad.validate().is_err(), "{email} should be rejected");
        }
    }

    #[test]
    fn summary_drops_id_and_owner() {
        let meal = Meal::from_broker(7, MealBroker::new(meal_in(&["Salt"], &["1 tsp"]), Uuid::new_v4()));
        let json = serde_json::to_value(MealSummary::from(meal)).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("user_id").is_none());
        assert_eq!(json["strMeal"], "Soup");
    }
}
