use crate::{
    domain::{FavouriteChange, MealRepository, UserRepository},
    errors::RepoError,
    models::{Meal, MealBroker, User},
};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{self, info};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, password, favourites";

const MEAL_COLUMNS: &str = r#"id, "strMeal", "strCategory", "strArea", "strInstructions", "strMealThumb", "strTags", "strYoutube", ingredients, measures, user_id"#;

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        info!("Initializing PgUserRepository");
        Self { pool }
    }

    /// Works out why a conditional favourites update touched no row.
    async fn diagnose_favourite_miss(
        &self,
        user_id: Uuid,
        meal_id: i32,
        otherwise: FavouriteChange,
    ) -> Result<FavouriteChange, RepoError> {
        let (meal_exists, user_exists): (bool, bool) = sqlx::query_as(
            r"
            SELECT
                EXISTS (SELECT 1 FROM meals WHERE id = $2),
                EXISTS (SELECT 1 FROM users WHERE id = $1)
            ",
        )
        .bind(user_id)
        .bind(meal_id)
        .fetch_one(&self.pool)
        .await
        .context(format!("Postgres: Failed to check user {} / meal {}", user_id, meal_id))?;

        Ok(if !meal_exists {
            FavouriteChange::MealNotFound
        } else if !user_exists {
            FavouriteChange::UserNotFound
        } else {
            otherwise
        })
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, email: &str, password_hash: &str) -> Result<Option<User>, RepoError> {
        let sql = format!(
            "INSERT INTO users (id, email, password) VALUES ($1, $2, $3) ON CONFLICT (email) DO NOTHING RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(email)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await
            .context(format!("Postgres: Failed to insert user (email: {})", email))?;

        if user.is_none() {
            tracing::debug!(%email, "Postgres: Email already registered");
        }
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context(format!("Postgres: Failed to get user (id: {})", id))?;
        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context(format!("Postgres: Failed to get user (email: {})", email))?;
        Ok(user)
    }

    async fn list_all(&self) -> Result<Vec<User>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY email");
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await
            .context("Postgres: Failed to list users")?;
        tracing::debug!("Postgres: Listed {} users", users.len());
        Ok(users)
    }

    async fn add_favourite(&self, user_id: Uuid, meal_id: i32) -> Result<FavouriteChange, RepoError> {
        // Single statement: the row lock serialises concurrent appends and the
        // membership check is re-evaluated against the latest row version.
        let updated = sqlx::query_scalar::<_, Uuid>(
            r"
            UPDATE users
            SET favourites = array_append(favourites, $2)
            WHERE id = $1
              AND NOT ($2 = ANY (favourites))
              AND EXISTS (SELECT 1 FROM meals WHERE id = $2)
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(meal_id)
        .fetch_optional(&self.pool)
        .await
        .context(format!("Postgres: Failed to add favourite (user: {}, meal: {})", user_id, meal_id))?;

        match updated {
            Some(_) => Ok(FavouriteChange::Added),
            None => {
                self.diagnose_favourite_miss(user_id, meal_id, FavouriteChange::AlreadyPresent)
                    .await
            }
        }
    }

    async fn remove_favourite(&self, user_id: Uuid, meal_id: i32) -> Result<FavouriteChange, RepoError> {
        let updated = sqlx::query_scalar::<_, Uuid>(
            r"
            UPDATE users
            SET favourites = array_remove(favourites, $2)
            WHERE id = $1
              AND $2 = ANY (favourites)
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(meal_id)
        .fetch_optional(&self.pool)
        .await
        .context(format!("Postgres: Failed to remove favourite (user: {}, meal: {})", user_id, meal_id))?;

        match updated {
            Some(_) => Ok(FavouriteChange::Removed),
            None => {
                self.diagnose_favourite_miss(user_id, meal_id, FavouriteChange::NotPresent)
                    .await
            }
        }
    }

    async fn favourite_names(&self, user_id: Uuid) -> Result<Vec<String>, RepoError> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT m."strMeal"
            FROM users u
            CROSS JOIN LATERAL unnest(u.favourites) WITH ORDINALITY AS f(meal_id, ord)
            JOIN meals m ON m.id = f.meal_id
            WHERE u.id = $1
            ORDER BY f.ord
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context(format!("Postgres: Failed to list favourites (user: {})", user_id))?;
        Ok(names)
    }
}

#[derive(Debug, Clone)]
pub struct PgMealRepository {
    pool: PgPool,
}

impl PgMealRepository {
    pub fn new(pool: PgPool) -> Self {
        info!("Initializing PgMealRepository");
        Self { pool }
    }

    async fn fetch_where(&self, clause: &str, arg: impl ToString, what: &str) -> Result<Vec<Meal>, RepoError> {
        let sql = format!("SELECT {MEAL_COLUMNS} FROM meals WHERE {clause} ORDER BY \"strMeal\" ASC");
        let meals = sqlx::query_as::<_, Meal>(&sql)
            .bind(arg.to_string())
            .fetch_all(&self.pool)
            .await
            .context(format!("Postgres: Failed to query meals by {}", what))?;
        tracing::debug!("Postgres: {} meals matched by {}", meals.len(), what);
        Ok(meals)
    }
}

#[async_trait]
impl MealRepository for PgMealRepository {
    async fn list_all(&self) -> Result<Vec<Meal>, RepoError> {
        let sql = format!("SELECT {MEAL_COLUMNS} FROM meals ORDER BY id ASC");
        let meals = sqlx::query_as::<_, Meal>(&sql)
            .fetch_all(&self.pool)
            .await
            .context("Postgres: Failed to list meals")?;
        tracing::info!("Postgres: Successfully listed {} meals", meals.len());
        Ok(meals)
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Meal>, RepoError> {
        let sql = format!("SELECT {MEAL_COLUMNS} FROM meals WHERE id = $1");
        let meal = sqlx::query_as::<_, Meal>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context(format!("Postgres: Failed to get meal (id: {})", id))?;
        Ok(meal)
    }

    async fn find_by_name(&self, fragment: &str) -> Result<Vec<Meal>, RepoError> {
        let pattern = format!("%{}%", escape_like(fragment));
        self.fetch_where(r#""strMeal" ILIKE $1 ESCAPE '\'"#, pattern, "name").await
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<Meal>, RepoError> {
        self.fetch_where(r#"lower("strCategory") = lower($1)"#, category, "category").await
    }

    async fn find_by_area(&self, area: &str) -> Result<Vec<Meal>, RepoError> {
        self.fetch_where(r#"lower("strArea") = lower($1)"#, area, "area").await
    }

    async fn find_by_ingredient(&self, ingredient: &str) -> Result<Vec<Meal>, RepoError> {
        let sql = format!("SELECT {MEAL_COLUMNS} FROM meals WHERE ingredients @> $1 ORDER BY \"strMeal\" ASC");
        let meals = sqlx::query_as::<_, Meal>(&sql)
            .bind(vec![ingredient.to_string()])
            .fetch_all(&self.pool)
            .await
            .context(format!("Postgres: Failed to query meals by ingredient '{}'", ingredient))?;
        Ok(meals)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Meal>, RepoError> {
        let sql = format!("SELECT {MEAL_COLUMNS} FROM meals WHERE user_id = $1 ORDER BY \"strMeal\" ASC");
        let meals = sqlx::query_as::<_, Meal>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .context(format!("Postgres: Failed to query meals of user {}", user_id))?;
        Ok(meals)
    }

    async fn create(&self, broker: &MealBroker) -> Result<Meal, RepoError> {
        let sql = format!(
            r#"
            INSERT INTO meals ("strMeal", "strCategory", "strArea", "strInstructions", "strMealThumb", "strTags", "strYoutube", ingredients, measures, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {MEAL_COLUMNS}
            "#
        );
        let meal = &broker.meal;
        let created = sqlx::query_as::<_, Meal>(&sql)
            .bind(&meal.name)
            .bind(&meal.category)
            .bind(&meal.area)
            .bind(&meal.instructions)
            .bind(&meal.thumbnail)
            .bind(&meal.tags)
            .bind(&meal.video_url)
            .bind(&meal.ingredients)
            .bind(&meal.measures)
            .bind(broker.user_id)
            .fetch_one(&self.pool)
            .await
            .context(format!("Postgres: Failed to insert meal '{}'", meal.name))?;

        tracing::debug!(meal_id = created.id, "Postgres: Meal inserted");
        Ok(created)
    }

    async fn update(&self, id: i32, broker: &MealBroker) -> Result<Option<Meal>, RepoError> {
        let sql = format!(
            r#"
            UPDATE meals SET
                "strMeal" = $2,
                "strCategory" = $3,
                "strArea" = $4,
                "strInstructions" = $5,
                "strMealThumb" = $6,
                "strTags" = $7,
                "strYoutube" = $8,
                ingredients = $9,
                measures = $10
            WHERE id = $1
            RETURNING {MEAL_COLUMNS}
            "#
        );
        let meal = &broker.meal;
        let updated = sqlx::query_as::<_, Meal>(&sql)
            .bind(id)
            .bind(&meal.name)
            .bind(&meal.category)
            .bind(&meal.area)
            .bind(&meal.instructions)
            .bind(&meal.thumbnail)
            .bind(&meal.tags)
            .bind(&meal.video_url)
            .bind(&meal.ingredients)
            .bind(&meal.measures)
            .fetch_optional(&self.pool)
            .await
            .context(format!("Postgres: Failed to update meal (id: {})", id))?;
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        tracing::debug!(meal_id = id, "Postgres: Deleting meal");
        let mut tx = self.pool.begin().await.context("Postgres: Failed to begin transaction")?;

        sqlx::query("UPDATE users SET favourites = array_remove(favourites, $1) WHERE $1 = ANY (favourites)")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context(format!("Postgres: Failed to scrub meal {} from favourites", id))?;

        let deleted = sqlx::query("DELETE FROM meals WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context(format!("Postgres: Failed to delete meal (id: {})", id))?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await.context("Postgres: Failed to roll back transaction")?;
            return Err(RepoError::MealNotFound(id));
        }

        tx.commit().await.context("Postgres: Failed to commit meal deletion")?;
        Ok(())
    }

    async fn random_sample(&self, n: usize) -> Result<Vec<Meal>, RepoError> {
        let limit = i64::try_from(n).unwrap_or(i64::MAX);
        let sql = format!("SELECT {MEAL_COLUMNS} FROM meals ORDER BY random() LIMIT $1");
        let meals = sqlx::query_as::<_, Meal>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .context(format!("Postgres: Failed to sample {} meals", n))?;
        Ok(meals)
    }
}

/// Escapes LIKE metacharacters so the fragment matches literally.
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
