use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use sqlx::PgPool;
use time::Date;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{
        format_date, parse_date, today, DailyIntakeResponse, IntakeQuery, IntakeSummaryResponse,
        LogIntakeRequest, SummaryQuery,
    },
    repo::{self, DailyIntakeRow},
    services::accumulate_checked,
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    meals::{self, services::compute_meal_nutrients},
    nutrients::{NutrientProgress, NutrientVector},
    state::AppState,
    targets,
};

pub fn intake_routes() -> Router<AppState> {
    Router::new()
        .route("/daily-intake", get(list_intake).post(log_meal))
        .route("/daily-intake/summary", get(summary))
}

impl From<DailyIntakeRow> for DailyIntakeResponse {
    fn from(r: DailyIntakeRow) -> Self {
        Self {
            id: r.id,
            date: format_date(r.intake_date),
            meals: r.meal_ids,
            total_nutrients: r.nutrients,
            updated_at: r.updated_at,
        }
    }
}

/// Adds one meal's nutrients to the caller's total for the given day.
#[instrument(skip(state, body))]
pub async fn log_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<LogIntakeRequest>,
) -> ApiResult<Json<DailyIntakeResponse>> {
    let meal_id = body
        .meal_id
        .ok_or_else(|| ApiError::BadRequest("mealId is required".into()))?;
    let date = match body.date.as_deref() {
        Some(raw) => parse_date("date", raw)?,
        None => today(),
    };

    let (record, delta) = record_meal(&state.db, user_id, meal_id, date).await?;
    info!(
        %user_id,
        %meal_id,
        date = %format_date(date),
        calories = delta.calories,
        day_calories = record.nutrients.calories,
        "meal logged"
    );
    Ok(Json(record.into()))
}

/// Folds the meal into the (user, date) record in one transaction.
///
/// Returns the updated record and the meal's own contribution.
pub(crate) async fn record_meal(
    db: &PgPool,
    user_id: Uuid,
    meal_id: Uuid,
    date: Date,
) -> ApiResult<(DailyIntakeRow, NutrientVector)> {
    let mut tx = db.begin().await?;
    let meal = meals::repo::find_for_user(&mut *tx, user_id, meal_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Meal"))?;
    let items = meals::repo::load_items(&mut *tx, meal.id).await?;
    let delta = compute_meal_nutrients(&items, meal.water_intake);

    let (intake_id, existing) = repo::lock_day_tx(&mut tx, user_id, date).await?;
    let totals = accumulate_checked(existing, delta)?;
    repo::write_totals_tx(&mut tx, intake_id, &totals).await?;
    repo::link_meal_tx(&mut tx, intake_id, meal.id).await?;
    let record = repo::find_by_id(&mut *tx, intake_id).await?;
    tx.commit().await?;
    Ok((record, delta))
}

#[instrument(skip(state))]
pub async fn list_intake(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<IntakeQuery>,
) -> ApiResult<Json<Vec<DailyIntakeResponse>>> {
    let (start, end) = q.range(today())?;
    let rows = repo::list_range(&state.db, user_id, start, end).await?;
    Ok(Json(rows.into_iter().map(DailyIntakeResponse::from).collect()))
}

/// Intake for one day against the caller's current target.
#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<SummaryQuery>,
) -> ApiResult<Json<IntakeSummaryResponse>> {
    let date = match q.date.as_deref() {
        Some(raw) => parse_date("date", raw)?,
        None => today(),
    };
    let total = repo::list_range(&state.db, user_id, date, date)
        .await?
        .into_iter()
        .next()
        .map(|r| r.nutrients)
        .unwrap_or(NutrientVector::ZERO);
    let target = targets::repo::get_or_create(&state.db, user_id).await?;

    Ok(Json(IntakeSummaryResponse {
        date: format_date(date),
        progress: NutrientProgress::measure(&total, &target.nutrients),
        total_nutrients: total,
        target: target.nutrients,
    }))
}
