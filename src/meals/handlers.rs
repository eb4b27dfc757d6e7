use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateMealRequest, MealFoodInput, MealListItem, MealResponse, Pagination},
    repo,
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    foods,
    state::AppState,
};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/:id", get(get_meal).delete(delete_meal))
        .route("/meals/:id/foods", post(add_food))
}

async fn ensure_foods_exist(state: &AppState, foods: &[MealFoodInput]) -> ApiResult<()> {
    let ids: Vec<Uuid> = foods.iter().map(|f| f.food_id).collect();
    if ids.is_empty() {
        return Ok(());
    }
    let missing = foods::repo::missing_ids(&state.db, &ids).await?;
    if let Some(first) = missing.first() {
        warn!(food_id = %first, "meal references unknown food");
        return Err(ApiError::NotFound(format!("Food {first} not found")));
    }
    Ok(())
}

#[instrument(skip(state, body))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(mut body): Json<CreateMealRequest>,
) -> ApiResult<(StatusCode, HeaderMap, Json<MealResponse>)> {
    body.validate()?;
    ensure_foods_exist(&state, &body.foods).await?;

    let mut tx = state.db.begin().await?;
    let meal =
        repo::insert_meal_tx(&mut tx, user_id, &body.name, body.time_of_day, body.water_intake)
            .await?;
    repo::append_items_tx(&mut tx, meal.id, &body.foods).await?;
    let items = repo::load_items(&mut *tx, meal.id).await?;
    tx.commit().await?;

    info!(meal_id = %meal.id, foods = items.len(), "meal created");

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/meals/{}", meal.id)) {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(MealResponse::new(meal, items))))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> ApiResult<Json<Vec<MealListItem>>> {
    let (limit, offset) = p.clamped();
    let meals = repo::list_by_user(&state.db, user_id, limit, offset).await?;
    Ok(Json(meals.into_iter().map(MealListItem::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MealResponse>> {
    let meal = repo::find_for_user(&state.db, user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Meal"))?;
    let items = repo::load_items(&state.db, meal.id).await?;
    Ok(Json(MealResponse::new(meal, items)))
}

#[instrument(skip(state, body))]
pub async fn add_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<MealFoodInput>,
) -> ApiResult<Json<MealResponse>> {
    body.validate()?;
    ensure_foods_exist(&state, std::slice::from_ref(&body)).await?;

    let mut tx = state.db.begin().await?;
    let meal = repo::lock_for_user_tx(&mut tx, user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Meal"))?;
    repo::append_items_tx(&mut tx, meal.id, std::slice::from_ref(&body)).await?;
    let items = repo::load_items(&mut *tx, meal.id).await?;
    tx.commit().await?;

    info!(meal_id = %meal.id, food_id = %body.food_id, quantity = body.quantity, "food added to meal");
    Ok(Json(MealResponse::new(meal, items)))
}

/// Deleting a meal leaves daily totals it already contributed to unchanged.
#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !repo::delete_for_user(&state.db, user_id, id).await? {
        return Err(ApiError::not_found("Meal"));
    }
    info!(meal_id = %id, "meal deleted");
    Ok(StatusCode::NO_CONTENT)
}
