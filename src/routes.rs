use crate::{handlers, AppState};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

fn user_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(handlers::register_user))
        .route("/token", post(handlers::authenticate_user))
        .route("/user/{uuid}", get(handlers::get_user_by_uuid))
        .route("/user/email/{email}", get(handlers::get_user_by_email))
        .route("/favourites/{uuid}", get(handlers::get_favourites))
        .route("/favourites/{uuid}/add", post(handlers::add_to_favourites))
        .route("/favourites/{uuid}/remove", delete(handlers::remove_from_favourites))
}

fn meal_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/all", get(handlers::list_meals))
        .route("/recommendations", get(handlers::recommend_meals))
        .route("/create", post(handlers::create_meal))
        .route(
            "/{id}",
            get(handlers::get_meal)
                .put(handlers::update_meal)
                .delete(handlers::delete_meal),
        )
        .route("/name/{name}", get(handlers::meals_by_name))
        .route("/category/{category}", get(handlers::meals_by_category))
        .route("/area/{area}", get(handlers::meals_by_area))
        .route("/ingredient/{ingredient}", get(handlers::meals_by_ingredient))
        .route("/user/{uuid}", get(handlers::meals_by_user))
}

/// Creates the Axum router and associates routes with handlers.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/user", user_routes())
        .nest("/meal", meal_routes())
        // Middleware Layers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state) // Pass the application state
}
