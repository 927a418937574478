use meal_recipes_api::{
    config::Config,
    db::create_pool,
    domain::{MealRepository, UserRepository},
    errors::AppError,
    memory::InMemoryStore,
    repositories::{PgMealRepository, PgUserRepository},
    routes::create_router,
    startup::init_schema,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "meal_recipes_api=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(bind_address = %config.bind_address, "Configuration loaded");

    // --- Store adapters ---
    let (user_repo, meal_repo): (Arc<dyn UserRepository>, Arc<dyn MealRepository>) =
        match config.database_url.as_deref() {
            Some(url) => {
                let pool = create_pool(&config, url).await?;
                init_schema(&pool).await?;
                let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
                let meals: Arc<dyn MealRepository> = Arc::new(PgMealRepository::new(pool));
                (users, meals)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using the in-memory store; data will not survive a restart");
                let store = Arc::new(InMemoryStore::new());
                let users: Arc<dyn UserRepository> = store.clone();
                let meals: Arc<dyn MealRepository> = store;
                (users, meals)
            }
        };

    // --- Application State ---
    let state = Arc::new(AppState::from_config(&config, user_repo, meal_repo));
    let app = create_router(state);

    // --- Server Startup ---
    tracing::info!("Server listening on http://{}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
