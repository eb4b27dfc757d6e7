use anyhow::Context;
use sqlx::{FromRow, PgExecutor, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrients::NutrientVector;

#[derive(Debug, Clone, FromRow)]
pub struct NutrientTarget {
    pub user_id: Uuid,
    #[sqlx(flatten)]
    pub nutrients: NutrientVector,
    pub updated_at: OffsetDateTime,
}

const TARGET_COLUMNS: &str = "user_id, protein, calories, carbohydrates, fats, potassium, \
     phosphorus, sodium, calcium, magnesium, water, updated_at";

/// Inserts the base vector for a user without a target; existing rows are kept.
async fn ensure_default<'e>(ex: impl PgExecutor<'e>, user_id: Uuid) -> anyhow::Result<()> {
    let b = NutrientVector::BASE;
    sqlx::query(
        r#"
        INSERT INTO nutrient_targets (user_id, protein, calories, carbohydrates, fats,
                                      potassium, phosphorus, sodium, calcium, magnesium, water)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(b.protein)
    .bind(b.calories)
    .bind(b.carbohydrates)
    .bind(b.fats)
    .bind(b.potassium)
    .bind(b.phosphorus)
    .bind(b.sodium)
    .bind(b.calcium)
    .bind(b.magnesium)
    .bind(b.water)
    .execute(ex)
    .await
    .context("insert default nutrient target")?;
    Ok(())
}

pub async fn get_or_create(db: &PgPool, user_id: Uuid) -> anyhow::Result<NutrientTarget> {
    ensure_default(db, user_id).await?;
    let row = sqlx::query_as::<_, NutrientTarget>(&format!(
        "SELECT {TARGET_COLUMNS} FROM nutrient_targets WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_one(db)
    .await
    .context("load nutrient target")?;
    Ok(row)
}

/// Current target, row-locked until the transaction ends.
pub async fn lock_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> anyhow::Result<NutrientTarget> {
    ensure_default(&mut **tx, user_id).await?;
    let row = sqlx::query_as::<_, NutrientTarget>(&format!(
        "SELECT {TARGET_COLUMNS} FROM nutrient_targets WHERE user_id = $1 FOR UPDATE"
    ))
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await
    .context("lock nutrient target")?;
    Ok(row)
}

/// Replaces the whole target vector.
pub async fn replace<'e>(
    ex: impl PgExecutor<'e>,
    user_id: Uuid,
    n: &NutrientVector,
) -> anyhow::Result<NutrientTarget> {
    let row = sqlx::query_as::<_, NutrientTarget>(&format!(
        r#"
        INSERT INTO nutrient_targets (user_id, protein, calories, carbohydrates, fats,
                                      potassium, phosphorus, sodium, calcium, magnesium, water)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (user_id) DO UPDATE
           SET protein = EXCLUDED.protein,
               calories = EXCLUDED.calories,
               carbohydrates = EXCLUDED.carbohydrates,
               fats = EXCLUDED.fats,
               potassium = EXCLUDED.potassium,
               phosphorus = EXCLUDED.phosphorus,
               sodium = EXCLUDED.sodium,
               calcium = EXCLUDED.calcium,
               magnesium = EXCLUDED.magnesium,
               water = EXCLUDED.water,
               updated_at = now()
        RETURNING {TARGET_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(n.protein)
    .bind(n.calories)
    .bind(n.carbohydrates)
    .bind(n.fats)
    .bind(n.potassium)
    .bind(n.phosphorus)
    .bind(n.sodium)
    .bind(n.calcium)
    .bind(n.magnesium)
    .bind(n.water)
    .fetch_one(ex)
    .await
    .context("replace nutrient target")?;
    Ok(row)
}
