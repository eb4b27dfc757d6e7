use anyhow::Context;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use super::{
    dto::MealFoodInput,
    repo_types::{Meal, MealItem, MealItemRow, MealRow, TimeOfDay},
};

const MEAL_COLUMNS: &str = "id, user_id, name, time_of_day, water_intake, created_at";

pub async fn insert_meal_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    name: &str,
    time_of_day: TimeOfDay,
    water_intake: f64,
) -> anyhow::Result<Meal> {
    let row = sqlx::query_as::<_, MealRow>(&format!(
        r#"
        INSERT INTO meals (user_id, name, time_of_day, water_intake)
        VALUES ($1, $2, $3, $4)
        RETURNING {MEAL_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(name)
    .bind(time_of_day.as_str())
    .bind(water_intake)
    .fetch_one(&mut **tx)
    .await
    .context("insert meal")?;
    row.try_into()
}

/// Appends `foods` after the current last position of the meal.
pub async fn append_items_tx(
    tx: &mut Transaction<'_, Postgres>,
    meal_id: Uuid,
    foods: &[MealFoodInput],
) -> anyhow::Result<()> {
    if foods.is_empty() {
        return Ok(());
    }
    let next: i32 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM meal_foods WHERE meal_id = $1",
    )
    .bind(meal_id)
    .fetch_one(&mut **tx)
    .await
    .context("next meal position")?;

    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO meal_foods (meal_id, position, food_id, quantity) ");
    qb.push_values(foods.iter().zip(next..), |mut b, (f, pos)| {
        b.push_bind(meal_id)
            .push_bind(pos)
            .push_bind(f.food_id)
            .push_bind(f.quantity);
    });
    qb.build()
        .execute(&mut **tx)
        .await
        .context("insert meal foods")?;
    Ok(())
}

/// Meal owned by `user_id`, locked for the rest of the transaction.
pub async fn lock_for_user_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    meal_id: Uuid,
) -> anyhow::Result<Option<Meal>> {
    let row = sqlx::query_as::<_, MealRow>(&format!(
        "SELECT {MEAL_COLUMNS} FROM meals WHERE id = $1 AND user_id = $2 FOR UPDATE"
    ))
    .bind(meal_id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await
    .context("lock meal")?;
    row.map(Meal::try_from).transpose()
}

pub async fn find_for_user<'e>(
    ex: impl PgExecutor<'e>,
    user_id: Uuid,
    meal_id: Uuid,
) -> anyhow::Result<Option<Meal>> {
    let row = sqlx::query_as::<_, MealRow>(&format!(
        "SELECT {MEAL_COLUMNS} FROM meals WHERE id = $1 AND user_id = $2"
    ))
    .bind(meal_id)
    .bind(user_id)
    .fetch_optional(ex)
    .await
    .context("find meal")?;
    row.map(Meal::try_from).transpose()
}

/// Ordered items of a meal, left-joined against the catalog.
pub async fn load_items<'e>(ex: impl PgExecutor<'e>, meal_id: Uuid) -> anyhow::Result<Vec<MealItem>> {
    let rows = sqlx::query_as::<_, MealItemRow>(
        r#"
        SELECT mf.position, mf.quantity, mf.food_id,
               f.id AS resolved_id, f.name AS food_name, f.serving_size, f.serving_unit,
               COALESCE(f.protein, 0) AS protein,
               COALESCE(f.calories, 0) AS calories,
               COALESCE(f.carbohydrates, 0) AS carbohydrates,
               COALESCE(f.fats, 0) AS fats,
               COALESCE(f.potassium, 0) AS potassium,
               COALESCE(f.phosphorus, 0) AS phosphorus,
               COALESCE(f.sodium, 0) AS sodium,
               COALESCE(f.calcium, 0) AS calcium,
               COALESCE(f.magnesium, 0) AS magnesium,
               COALESCE(f.water, 0) AS water
          FROM meal_foods mf
          LEFT JOIN foods f ON f.id = mf.food_id
         WHERE mf.meal_id = $1
         ORDER BY mf.position ASC
        "#,
    )
    .bind(meal_id)
    .fetch_all(ex)
    .await
    .context("load meal items")?;
    Ok(rows.into_iter().map(MealItem::from).collect())
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Meal>> {
    let rows = sqlx::query_as::<_, MealRow>(&format!(
        r#"
        SELECT {MEAL_COLUMNS}
          FROM meals
         WHERE user_id = $1
         ORDER BY created_at DESC
         LIMIT $2 OFFSET $3
        "#
    ))
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list meals")?;
    rows.into_iter().map(Meal::try_from).collect()
}

/// Returns whether a row was deleted.
pub async fn delete_for_user(db: &PgPool, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM meals WHERE id = $1 AND user_id = $2")
        .bind(meal_id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete meal")?;
    Ok(res.rows_affected() > 0)
}
