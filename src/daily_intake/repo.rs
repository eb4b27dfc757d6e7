use anyhow::Context;
use sqlx::{FromRow, PgExecutor, Postgres, Transaction};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::nutrients::{NutrientField, NutrientVector};

#[derive(Debug, Clone, FromRow)]
pub struct DailyIntakeRow {
    pub id: Uuid,
    pub intake_date: Date,
    #[sqlx(flatten)]
    pub nutrients: NutrientVector,
    pub meal_ids: Vec<Uuid>,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
struct TotalsRow {
    id: Uuid,
    #[sqlx(flatten)]
    nutrients: NutrientVector,
}

const NUTRIENT_COLUMNS: &str = "protein, calories, carbohydrates, fats, potassium, phosphorus, \
     sodium, calcium, magnesium, water";

const INTAKE_SELECT: &str = r#"
    SELECT di.id, di.user_id, di.intake_date,
           di.protein, di.calories, di.carbohydrates, di.fats, di.potassium,
           di.phosphorus, di.sodium, di.calcium, di.magnesium, di.water,
           COALESCE(
               array_agg(dim.meal_id ORDER BY dim.id) FILTER (WHERE dim.meal_id IS NOT NULL),
               '{}'
           ) AS meal_ids,
           di.updated_at
      FROM daily_intakes di
      LEFT JOIN daily_intake_meals dim ON dim.daily_intake_id = di.id
"#;

/// Locks the (user, date) record, creating an all-zero row first if needed.
///
/// Concurrent loggers for the same day serialize on the row lock, so no
/// increment is lost between the read and the write.
pub async fn lock_day_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    date: Date,
) -> anyhow::Result<(Uuid, Option<NutrientVector>)> {
    let created: Option<Uuid> = sqlx::query_scalar(
        r#"
        INSERT INTO daily_intakes (user_id, intake_date)
        VALUES ($1, $2)
        ON CONFLICT (user_id, intake_date) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(&mut **tx)
    .await
    .context("ensure daily intake row")?;

    let row = sqlx::query_as::<_, TotalsRow>(&format!(
        r#"
        SELECT id, {NUTRIENT_COLUMNS}
          FROM daily_intakes
         WHERE user_id = $1 AND intake_date = $2
         FOR UPDATE
        "#
    ))
    .bind(user_id)
    .bind(date)
    .fetch_one(&mut **tx)
    .await
    .context("lock daily intake row")?;

    // a row created by this transaction has no prior totals
    let existing = match created {
        Some(_) => None,
        None => Some(row.nutrients),
    };
    Ok((row.id, existing))
}

pub async fn write_totals_tx(
    tx: &mut Transaction<'_, Postgres>,
    intake_id: Uuid,
    totals: &NutrientVector,
) -> anyhow::Result<()> {
    let sets: Vec<String> = NutrientField::ALL
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{} = ${}", f.as_str(), i + 2))
        .collect();
    let sql = format!(
        "UPDATE daily_intakes SET {}, updated_at = now() WHERE id = $1",
        sets.join(", ")
    );
    let mut q = sqlx::query(&sql).bind(intake_id);
    for field in NutrientField::ALL {
        q = q.bind(totals.get(field));
    }
    q.execute(&mut **tx).await.context("write daily totals")?;
    Ok(())
}

pub async fn link_meal_tx(
    tx: &mut Transaction<'_, Postgres>,
    intake_id: Uuid,
    meal_id: Uuid,
) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO daily_intake_meals (daily_intake_id, meal_id) VALUES ($1, $2)")
        .bind(intake_id)
        .bind(meal_id)
        .execute(&mut **tx)
        .await
        .context("link meal to daily intake")?;
    Ok(())
}

pub async fn find_by_id<'e>(ex: impl PgExecutor<'e>, id: Uuid) -> anyhow::Result<DailyIntakeRow> {
    let row = sqlx::query_as::<_, DailyIntakeRow>(&format!(
        "{INTAKE_SELECT} WHERE di.id = $1 GROUP BY di.id"
    ))
    .bind(id)
    .fetch_one(ex)
    .await
    .context("load daily intake")?;
    Ok(row)
}

/// Records in `[start, end]`, newest first.
pub async fn list_range<'e>(
    ex: impl PgExecutor<'e>,
    user_id: Uuid,
    start: Date,
    end: Date,
) -> anyhow::Result<Vec<DailyIntakeRow>> {
    let rows = sqlx::query_as::<_, DailyIntakeRow>(&format!(
        r#"{INTAKE_SELECT}
         WHERE di.user_id = $1 AND di.intake_date BETWEEN $2 AND $3
         GROUP BY di.id
         ORDER BY di.intake_date DESC"#
    ))
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(ex)
    .await
    .context("list daily intakes")?;
    Ok(rows)
}
