use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CreateFoodRequest, FoodSearchQuery},
    repo,
    repo_types::Food,
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(search_foods).post(create_food))
        .route("/foods/:id", get(get_food))
}

#[instrument(skip(state, body))]
pub async fn create_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(mut body): Json<CreateFoodRequest>,
) -> ApiResult<(StatusCode, Json<Food>)> {
    body.validate()?;
    let food = repo::insert(&state.db, user_id, &body).await?;
    info!(food_id = %food.id, name = %food.name, category = %food.category, "food created");
    Ok((StatusCode::CREATED, Json(food)))
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Food>> {
    let food = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Food"))?;
    Ok(Json(food))
}

#[instrument(skip(state))]
pub async fn search_foods(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<FoodSearchQuery>,
) -> ApiResult<Json<Vec<Food>>> {
    let sort = q.sort()?;
    let foods = repo::search(&state.db, &q, sort).await?;
    Ok(Json(foods))
}
