use crate::errors::RepoError;
use crate::models::{Meal, MealBroker, User};
use async_trait::async_trait;
use uuid::Uuid;

/// What a favourites mutation actually did to the stored list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavouriteChange {
    Added,
    Removed,
    AlreadyPresent,
    NotPresent,
    MealNotFound,
    UserNotFound,
}

impl FavouriteChange {
    /// True when the stored list was modified.
    pub fn is_applied(self) -> bool {
        matches!(self, FavouriteChange::Added | FavouriteChange::Removed)
    }
}

/// Trait defining operations on user accounts and their favourites.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static { // Send+Sync+'static required for Arc<dyn>
    /// Inserts a new user. Returns Ok(None) if the email is already registered.
    async fn create(&self, email: &str, password_hash: &str) -> Result<Option<User>, RepoError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn list_all(&self) -> Result<Vec<User>, RepoError>;

    /// Appends `meal_id` to the user's favourites unless already present.
    /// Must be atomic with respect to concurrent mutations of the same user.
    async fn add_favourite(&self, user_id: Uuid, meal_id: i32) -> Result<FavouriteChange, RepoError>;

    /// Removes `meal_id` from the user's favourites if present.
    async fn remove_favourite(&self, user_id: Uuid, meal_id: i32) -> Result<FavouriteChange, RepoError>;

    /// Names of the user's favourite meals in insertion order.
    /// An unknown user yields an empty list.
    async fn favourite_names(&self, user_id: Uuid) -> Result<Vec<String>, RepoError>;
}

/// Trait defining operations for storing and querying meals.
#[async_trait]
pub trait MealRepository: Send + Sync + 'static {
    async fn list_all(&self) -> Result<Vec<Meal>, RepoError>;

    /// Returns Ok(None) if the meal is not found.
    async fn get_by_id(&self, id: i32) -> Result<Option<Meal>, RepoError>;

    /// Case-insensitive substring match on the meal name.
    async fn find_by_name(&self, fragment: &str) -> Result<Vec<Meal>, RepoError>;

    async fn find_by_category(&self, category: &str) -> Result<Vec<Meal>, RepoError>;

    async fn find_by_area(&self, area: &str) -> Result<Vec<Meal>, RepoError>;

    /// Meals whose ingredient list contains `ingredient` exactly.
    async fn find_by_ingredient(&self, ingredient: &str) -> Result<Vec<Meal>, RepoError>;

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Meal>, RepoError>;

    async fn create(&self, meal: &MealBroker) -> Result<Meal, RepoError>;

    /// Replaces the meal's fields. Returns Ok(None) if the meal does not exist.
    async fn update(&self, id: i32, meal: &MealBroker) -> Result<Option<Meal>, RepoError>;

    /// Deletes the meal and removes it from every user's favourites.
    async fn delete(&self, id: i32) -> Result<(), RepoError>;

    /// Up to `n` distinct meals sampled uniformly at random.
    async fn random_sample(&self, n: usize) -> Result<Vec<Meal>, RepoError>;
}
