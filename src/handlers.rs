use crate::{
    auth::AuthUser,
    errors::{parse_user_id, AppError},
    extract::{JsonBody, PathParam, QueryParams},
    models::{MealIn, UserIn},
    services::DEFAULT_RECOMMENDATIONS,
    AppState,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing;

#[derive(Debug, Deserialize)]
pub struct FavouriteParams {
    pub meal_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct RecommendParams {
    pub n: Option<usize>,
}

// --- Users ---

pub async fn register_user(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<UserIn>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.register_user(input).await?.ok_or(AppError::EmailTaken)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn authenticate_user(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<UserIn>,
) -> Result<impl IntoResponse, AppError> {
    let token = state
        .users
        .authenticate_user(input)
        .await?
        .ok_or(AppError::InvalidCredentials)?;
    tracing::info!("User confirmed, token issued");
    Ok(Json(token))
}

pub async fn get_user_by_uuid(
    State(state): State<Arc<AppState>>,
    PathParam(id_str): PathParam<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_user_id(&id_str)?;
    match state.users.get_by_uuid(user_id).await? {
        Some(user) => Ok(Json(user)),
        None => Err(AppError::UserNotFound(id_str)),
    }
}

pub async fn get_user_by_email(
    State(state): State<Arc<AppState>>,
    PathParam(email): PathParam<String>,
) -> Result<impl IntoResponse, AppError> {
    match state.users.get_by_email(&email).await? {
        Some(user) => Ok(Json(user)),
        None => Err(AppError::UserNotFound(email)),
    }
}

// --- Favourites ---

pub async fn add_to_favourites(
    State(state): State<Arc<AppState>>,
    PathParam(id_str): PathParam<String>,
    QueryParams(params): QueryParams<FavouriteParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_user_id(&id_str)?;
    if !state.favourites.add_to_favourites(user_id, params.meal_id).await? {
        return Err(AppError::NotFound("Meal not found or already in favourites".to_string()));
    }
    Ok((StatusCode::CREATED, Json(json!({ "message": "Meal added to favourites" }))))
}

pub async fn remove_from_favourites(
    State(state): State<Arc<AppState>>,
    PathParam(id_str): PathParam<String>,
    QueryParams(params): QueryParams<FavouriteParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_user_id(&id_str)?;
    if !state.favourites.remove_from_favourites(user_id, params.meal_id).await? {
        return Err(AppError::NotFound("Meal not found in favourites".to_string()));
    }
    Ok(Json(json!({ "message": "Meal removed from favourites" })))
}

pub async fn get_favourites(
    State(state): State<Arc<AppState>>,
    PathParam(id_str): PathParam<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_user_id(&id_str)?;
    let names = state.favourites.get_favourites(user_id).await?;
    Ok(Json(names))
}

// --- Meals ---

pub async fn list_meals(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let meals = state.meals.get_all_meals().await?;
    tracing::debug!("Handler retrieved {} meals", meals.len());
    Ok(Json(meals))
}

pub async fn get_meal(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
) -> Result<impl IntoResponse, AppError> {
    match state.meals.get_by_id(id).await? {
        Some(meal) => Ok(Json(meal)),
        None => Err(AppError::MealNotFound(id)),
    }
}

pub async fn meals_by_name(
    State(state): State<Arc<AppState>>,
    PathParam(name): PathParam<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.meals.get_by_name(&name).await?))
}

pub async fn meals_by_category(
    State(state): State<Arc<AppState>>,
    PathParam(category): PathParam<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.meals.get_by_category(&category).await?))
}

pub async fn meals_by_area(
    State(state): State<Arc<AppState>>,
    PathParam(area): PathParam<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.meals.get_by_area(&area).await?))
}

pub async fn meals_by_ingredient(
    State(state): State<Arc<AppState>>,
    PathParam(ingredient): PathParam<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.meals.get_by_ingredient(&ingredient).await?))
}

pub async fn meals_by_user(
    State(state): State<Arc<AppState>>,
    PathParam(id_str): PathParam<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_user_id(&id_str)?;
    Ok(Json(state.meals.get_by_user(user_id).await?))
}

pub async fn recommend_meals(
    State(state): State<Arc<AppState>>,
    QueryParams(params): QueryParams<RecommendParams>,
) -> Result<impl IntoResponse, AppError> {
    let n = params.n.unwrap_or(DEFAULT_RECOMMENDATIONS);
    let meals = state.recommendations.recommend_meals(n).await?;
    Ok(Json(meals))
}

pub async fn create_meal(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    JsonBody(input): JsonBody<MealIn>,
) -> Result<impl IntoResponse, AppError> {
    let meal = state.meals.add_meal(input, caller).await?;
    Ok((StatusCode::CREATED, Json(meal)))
}

pub async fn update_meal(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    PathParam(id): PathParam<i32>,
    JsonBody(input): JsonBody<MealIn>,
) -> Result<impl IntoResponse, AppError> {
    let meal = state.meals.update_meal(id, input, caller).await?;
    Ok(Json(meal))
}

/// Deletes the meal; it also disappears from every user's favourites.
pub async fn delete_meal(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    PathParam(id): PathParam<i32>,
) -> Result<StatusCode, AppError> {
    state.meals.delete_meal(id, caller).await?;
    Ok(StatusCode::NO_CONTENT)
}
