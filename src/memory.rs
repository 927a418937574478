use crate::{
    domain::{FavouriteChange, MealRepository, UserRepository},
    errors::RepoError,
    models::{Meal, MealBroker, User},
};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    meals: BTreeMap<i32, Meal>,
    next_meal_id: i32,
}

/// Process-local store implementing both repositories.
///
/// Both tables sit behind one lock so favourites and meal deletion see a
/// consistent view, mirroring what a transaction gives the Postgres adapter.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        tracing::info!("Initializing InMemoryStore");
        Self::default()
    }
}

fn sorted_by_name(mut meals: Vec<Meal>) -> Vec<Meal> {
    meals.sort_by(|a, b| a.name.cmp(&b.name));
    meals
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, email: &str, password_hash: &str) -> Result<Option<User>, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == email) {
            return Ok(None);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            favourites: Vec::new(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(Some(user))
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, RepoError> {
        let mut users: Vec<User> = self.tables.read().await.users.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn add_favourite(&self, user_id: Uuid, meal_id: i32) -> Result<FavouriteChange, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.meals.contains_key(&meal_id) {
            return Ok(FavouriteChange::MealNotFound);
        }
        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(FavouriteChange::UserNotFound);
        };
        if user.favourites.contains(&meal_id) {
            return Ok(FavouriteChange::AlreadyPresent);
        }
        user.favourites.push(meal_id);
        Ok(FavouriteChange::Added)
    }

    async fn remove_favourite(&self, user_id: Uuid, meal_id: i32) -> Result<FavouriteChange, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.meals.contains_key(&meal_id) {
            return Ok(FavouriteChange::MealNotFound);
        }
        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(FavouriteChange::UserNotFound);
        };
        match user.favourites.iter().position(|id| *id == meal_id) {
            Some(index) => {
                user.favourites.remove(index);
                Ok(FavouriteChange::Removed)
            }
            None => Ok(FavouriteChange::NotPresent),
        }
    }

    async fn favourite_names(&self, user_id: Uuid) -> Result<Vec<String>, RepoError> {
        let tables = self.tables.read().await;
        let Some(user) = tables.users.get(&user_id) else {
            return Ok(Vec::new());
        };
        Ok(user
            .favourites
            .iter()
            .filter_map(|id| tables.meals.get(id))
            .map(|meal| meal.name.clone())
            .collect())
    }
}

#[async_trait]
impl MealRepository for InMemoryStore {
    async fn list_all(&self) -> Result<Vec<Meal>, RepoError> {
        Ok(self.tables.read().await.meals.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Meal>, RepoError> {
        Ok(self.tables.read().await.meals.get(&id).cloned())
    }

    async fn find_by_name(&self, fragment: &str) -> Result<Vec<Meal>, RepoError> {
        let needle = fragment.to_lowercase();
        let tables = self.tables.read().await;
        let meals = tables
            .meals
            .values()
            .filter(|m| m.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(sorted_by_name(meals))
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<Meal>, RepoError> {
        let tables = self.tables.read().await;
        let meals = tables
            .meals
            .values()
            .filter(|m| m.category.as_deref().is_some_and(|c| c.to_lowercase() == category.to_lowercase()))
            .cloned()
            .collect();
        Ok(sorted_by_name(meals))
    }

    async fn find_by_area(&self, area: &str) -> Result<Vec<Meal>, RepoError> {
        let tables = self.tables.read().await;
        let meals = tables
            .meals
            .values()
            .filter(|m| m.area.as_deref().is_some_and(|a| a.to_lowercase() == area.to_lowercase()))
            .cloned()
            .collect();
        Ok(sorted_by_name(meals))
    }

    async fn find_by_ingredient(&self, ingredient: &str) -> Result<Vec<Meal>, RepoError> {
        let tables = self.tables.read().await;
        let meals = tables
            .meals
            .values()
            .filter(|m| m.ingredients.iter().any(|i| i == ingredient))
            .cloned()
            .collect();
        Ok(sorted_by_name(meals))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Meal>, RepoError> {
        let tables = self.tables.read().await;
        let meals = tables.meals.values().filter(|m| m.user_id == user_id).cloned().collect();
        Ok(sorted_by_name(meals))
    }

    async fn create(&self, broker: &MealBroker) -> Result<Meal, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&broker.user_id) {
            return Err(RepoError::BackendError(anyhow::anyhow!(
                "meal owner {} does not exist",
                broker.user_id
            )));
        }
        tables.next_meal_id += 1;
        let meal = Meal::from_broker(tables.next_meal_id, broker.clone());
        tables.meals.insert(meal.id, meal.clone());
        Ok(meal)
    }

    async fn update(&self, id: i32, broker: &MealBroker) -> Result<Option<Meal>, RepoError> {
        let mut tables = self.tables.write().await;
        let Some(existing) = tables.meals.get_mut(&id) else {
            return Ok(None);
        };
        let owner = existing.user_id;
        *existing = Meal::from_broker(id, MealBroker::new(broker.meal.clone(), owner));
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.meals.remove(&id).is_none() {
            return Err(RepoError::MealNotFound(id));
        }
        for user in tables.users.values_mut() {
            user.favourites.retain(|fav| *fav != id);
        }
        Ok(())
    }

    async fn random_sample(&self, n: usize) -> Result<Vec<Meal>, RepoError> {
        let tables = self.tables.read().await;
        let corpus: Vec<&Meal> = tables.meals.values().collect();
        let mut rng = rand::thread_rng();
        Ok(corpus.choose_multiple(&mut rng, n).map(|meal| (*meal).clone()).collect())
    }
}
