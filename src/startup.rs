use crate::errors::AppError;
use sqlx::PgPool;
use tracing;

const CREATE_USERS: &str = r"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email TEXT UNIQUE NOT NULL,
        password TEXT NOT NULL,
        favourites INTEGER[] NOT NULL DEFAULT '{}'
    )
";

const CREATE_MEALS: &str = r#"
    CREATE TABLE IF NOT EXISTS meals (
        id SERIAL PRIMARY KEY,
        "strMeal" TEXT NOT NULL,
        "strInstructions" TEXT NOT NULL,
        ingredients TEXT[] NOT NULL DEFAULT '{}',
        measures TEXT[] NOT NULL DEFAULT '{}',
        "strCategory" TEXT,
        "strArea" TEXT,
        "strMealThumb" TEXT,
        "strTags" TEXT,
        "strYoutube" TEXT,
        user_id UUID NOT NULL REFERENCES users(id)
    )
"#;

const CREATE_INDEXES: [&str; 2] = [
    "CREATE INDEX IF NOT EXISTS idx_meals_user_id ON meals(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_meals_ingredients ON meals USING GIN (ingredients)",
];

/// Creates the users and meals tables if they don't exist.
pub async fn init_schema(pool: &PgPool) -> Result<(), AppError> {
    tracing::info!("Startup: Ensuring database schema...");
    for (name, ddl) in [("users", CREATE_USERS), ("meals", CREATE_MEALS)] {
        sqlx::query(ddl).execute(pool).await.map_err(|e| {
            let context = format!("Startup: Failed to create table '{}'", name);
            tracing::error!("{}: {}", context, e);
            AppError::InitError(format!("{}: {}", context, e))
        })?;
    }
    for ddl in CREATE_INDEXES {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| AppError::InitError(format!("Startup: Failed to create index: {}", e)))?;
    }
    tracing::info!("Startup: Database schema ready.");
    Ok(())
}
