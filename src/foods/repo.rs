use anyhow::Context;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    dto::{like_pattern, CreateFoodRequest, FoodSearchQuery, FoodSort},
    repo_types::{Food, FoodRow},
};

pub(crate) const FOOD_COLUMNS: &str = "id, name, category, serving_size, serving_unit, \
     protein, calories, carbohydrates, fats, potassium, phosphorus, sodium, calcium, \
     magnesium, water, kidney_friendly, created_by, created_at";

pub async fn insert(db: &PgPool, created_by: Uuid, req: &CreateFoodRequest) -> anyhow::Result<Food> {
    let n = &req.nutrients;
    let row = sqlx::query_as::<_, FoodRow>(&format!(
        r#"
        INSERT INTO foods (name, category, serving_size, serving_unit,
                           protein, calories, carbohydrates, fats, potassium,
                           phosphorus, sodium, calcium, magnesium, water,
                           kidney_friendly, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING {FOOD_COLUMNS}
        "#
    ))
    .bind(&req.name)
    .bind(req.category.as_str())
    .bind(req.serving_size)
    .bind(&req.serving_unit)
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
    .bind(req.kidney_friendly)
    .bind(created_by)
    .fetch_one(db)
    .await
    .context("insert food")?;
    row.try_into()
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Food>> {
    let row = sqlx::query_as::<_, FoodRow>(&format!(
        "SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find food by id")?;
    row.map(Food::try_from).transpose()
}

/// IDs from `ids` that have no catalog row.
pub async fn missing_ids(db: &PgPool, ids: &[Uuid]) -> anyhow::Result<Vec<Uuid>> {
    let found: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM foods WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(db)
        .await
        .context("check food ids")?;
    let mut missing: Vec<Uuid> = ids.iter().filter(|id| !found.contains(id)).copied().collect();
    missing.sort();
    missing.dedup();
    Ok(missing)
}

pub async fn search(db: &PgPool, q: &FoodSearchQuery, sort: FoodSort) -> anyhow::Result<Vec<Food>> {
    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {FOOD_COLUMNS} FROM foods WHERE TRUE"));

    if let Some(term) = q.q.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        qb.push(" AND name ILIKE ").push_bind(like_pattern(term));
    }
    if let Some(category) = q.category {
        qb.push(" AND category = ").push_bind(category.as_str());
    }
    if let Some(kf) = q.kidney_friendly {
        qb.push(" AND kidney_friendly = ").push_bind(kf);
    }
    qb.push(" ORDER BY ").push(sort.order_by());
    qb.push(" LIMIT ").push_bind(q.limit());
    qb.push(" OFFSET ").push_bind(q.offset());

    let rows = qb
        .build_query_as::<FoodRow>()
        .fetch_all(db)
        .await
        .context("search foods")?;
    rows.into_iter().map(Food::try_from).collect()
}
