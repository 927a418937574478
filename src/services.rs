use crate::{
    auth::{Passwords, TokenIssuer},
    domain::{FavouriteChange, MealRepository, UserRepository},
    errors::{AppError, RepoError},
    models::{Meal, MealBroker, MealIn, MealSummary, TokenDto, UserDto, UserIn},
};
use std::sync::Arc;
use tracing;
use uuid::Uuid;

pub const DEFAULT_RECOMMENDATIONS: usize = 3;

/// Keeps each user's favourite meals as an insertion-ordered set.
#[derive(Clone)]
pub struct FavouritesManager {
    users: Arc<dyn UserRepository>,
}

impl FavouritesManager {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Appends the meal to the user's favourites.
    /// False when the meal or user is unknown, or the meal is already a favourite.
    pub async fn add_to_favourites(&self, user_id: Uuid, meal_id: i32) -> Result<bool, RepoError> {
        let change = self.users.add_favourite(user_id, meal_id).await?;
        tracing::debug!(%user_id, meal_id, ?change, "Add to favourites");
        if change == FavouriteChange::AlreadyPresent {
            tracing::info!(%user_id, meal_id, "Meal already in favourites");
        }
        Ok(change.is_applied())
    }

    /// False when the meal is unknown or not among the user's favourites.
    pub async fn remove_from_favourites(&self, user_id: Uuid, meal_id: i32) -> Result<bool, RepoError> {
        let change = self.users.remove_favourite(user_id, meal_id).await?;
        tracing::debug!(%user_id, meal_id, ?change, "Remove from favourites");
        Ok(change.is_applied())
    }

    pub async fn get_favourites(&self, user_id: Uuid) -> Result<Vec<String>, RepoError> {
        self.users.favourite_names(user_id).await
    }
}

/// Uniform random sampling over the whole meal corpus.
#[derive(Clone)]
pub struct RecommendationEngine {
    meals: Arc<dyn MealRepository>,
}

impl RecommendationEngine {
    pub fn new(meals: Arc<dyn MealRepository>) -> Self {
        Self { meals }
    }

    pub async fn recommend_meals(&self, n: usize) -> Result<Vec<MealSummary>, RepoError> {
        let sample = self.meals.random_sample(n).await?;
        tracing::debug!(requested = n, returned = sample.len(), "Recommended meals");
        Ok(sample.into_iter().map(MealSummary::from).collect())
    }
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    passwords: Passwords,
    tokens: TokenIssuer,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Passwords, tokens: TokenIssuer) -> Self {
        Self { users, passwords, tokens }
    }

    /// Returns Ok(None) when the email is already registered.
    pub async fn register_user(&self, input: UserIn) -> Result<Option<UserDto>, AppError> {
        input.validate()?;
        let email = input.email.trim();
        let password_hash = self.passwords.hash(&input.password).await?;
        let created = self.users.create(email, &password_hash).await?;
        if let Some(user) = &created {
            tracing::info!(user_id = %user.id, "User registered");
        }
        Ok(created.map(UserDto::from))
    }

    /// Returns Ok(None) on unknown email or wrong password.
    pub async fn authenticate_user(&self, input: UserIn) -> Result<Option<TokenDto>, AppError> {
        let Some(user) = self.users.get_by_email(input.email.trim()).await? else {
            return Ok(None);
        };
        if !self.passwords.verify(&input.password, &user.password_hash).await {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Ok(None);
        }
        let (user_token, expires) = self.tokens.issue(user.id)?;
        Ok(Some(TokenDto {
            token_type: "Bearer".to_string(),
            user_token,
            expires,
        }))
    }

    pub async fn get_by_uuid(&self, id: Uuid) -> Result<Option<UserDto>, RepoError> {
        Ok(self.users.get_by_id(id).await?.map(UserDto::from))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<UserDto>, RepoError> {
        Ok(self.users.get_by_email(email.trim()).await?.map(UserDto::from))
    }

    pub async fn get_all_users(&self) -> Result<Vec<UserDto>, RepoError> {
        Ok(self.users.list_all().await?.into_iter().map(UserDto::from).collect())
    }
}

#[derive(Clone)]
pub struct MealService {
    meals: Arc<dyn MealRepository>,
}

impl MealService {
    pub fn new(meals: Arc<dyn MealRepository>) -> Self {
        Self { meals }
    }

    pub async fn get_all_meals(&self) -> Result<Vec<Meal>, RepoError> {
        self.meals.list_all().await
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<Meal>, RepoError> {
        self.meals.get_by_id(id).await
    }

    pub async fn get_by_name(&self, fragment: &str) -> Result<Vec<Meal>, RepoError> {
        self.meals.find_by_name(fragment).await
    }

    pub async fn get_by_category(&self, category: &str) -> Result<Vec<Meal>, RepoError> {
        self.meals.find_by_category(category).await
    }

    pub async fn get_by_area(&self, area: &str) -> Result<Vec<Meal>, RepoError> {
        self.meals.find_by_area(area).await
    }

    pub async fn get_by_ingredient(&self, ingredient: &str) -> Result<Vec<Meal>, RepoError> {
        self.meals.find_by_ingredient(ingredient).await
    }

    pub async fn get_by_user(&self, user_id: Uuid) -> Result<Vec<Meal>, RepoError> {
        self.meals.find_by_user(user_id).await
    }

    pub async fn add_meal(&self, input: MealIn, owner: Uuid) -> Result<Meal, AppError> {
        input.validate()?;
        let meal = self.meals.create(&MealBroker::new(input, owner)).await?;
        tracing::info!(meal_id = meal.id, %owner, "Meal created");
        Ok(meal)
    }

    pub async fn update_meal(&self, id: i32, input: MealIn, caller: Uuid) -> Result<Meal, AppError> {
        input.validate()?;
        self.ensure_owner(id, caller).await?;
        let updated = self
            .meals
            .update(id, &MealBroker::new(input, caller))
            .await?
            .ok_or(AppError::MealNotFound(id))?;
        tracing::info!(meal_id = id, "Meal updated");
        Ok(updated)
    }

    pub async fn delete_meal(&self, id: i32, caller: Uuid) -> Result<(), AppError> {
        self.ensure_owner(id, caller).await?;
        self.meals.delete(id).await?;
        tracing::info!(meal_id = id, "Meal deleted");
        Ok(())
    }

    async fn ensure_owner(&self, id: i32, caller: Uuid) -> Result<(), AppError> {
        let meal = self.meals.get_by_id(id).await?.ok_or(AppError::MealNotFound(id))?;
        if meal.user_id != caller {
            tracing::warn!(meal_id = id, %caller, owner = %meal.user_id, "Caller does not own meal");
            return Err(AppError::Forbidden(format!("Meal {} belongs to another user", id)));
        }
        Ok(())
    }
}
