pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod startup;

use std::sync::Arc;

use crate::{
    auth::{Passwords, TokenIssuer},
    config::Config,
    domain::{MealRepository, UserRepository},
    services::{FavouritesManager, MealService, RecommendationEngine, UserService},
};

/// AppState holds the services shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub meals: MealService,
    pub favourites: FavouritesManager,
    pub recommendations: RecommendationEngine,
    pub tokens: TokenIssuer,
}

impl AppState {
    /// Wires the services on top of the given store adapters.
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        meal_repo: Arc<dyn MealRepository>,
        passwords: Passwords,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            users: UserService::new(user_repo.clone(), passwords, tokens.clone()),
            meals: MealService::new(meal_repo.clone()),
            favourites: FavouritesManager::new(user_repo),
            recommendations: RecommendationEngine::new(meal_repo),
            tokens,
        }
    }

    pub fn from_config(
        config: &Config,
        user_repo: Arc<dyn UserRepository>,
        meal_repo: Arc<dyn MealRepository>,
    ) -> Self {
        Self::new(
            user_repo,
            meal_repo,
            Passwords::new(config.bcrypt_cost),
            TokenIssuer::new(&config.jwt_secret, config.jwt_expiration_minutes),
        )
    }
}
