use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::FoodCategory;
use crate::nutrients::NutrientVector;

#[derive(Debug, Clone, FromRow)]
pub struct FoodRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub serving_size: f64,
    pub serving_unit: String,
    #[sqlx(flatten)]
    pub nutrients: NutrientVector,
    pub kidney_friendly: bool,
    pub created_by: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

/// A catalog entry. Nutrients are per serving.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    pub category: FoodCategory,
    pub serving_size: f64,
    pub serving_unit: String,
    pub nutrients: NutrientVector,
    pub kidney_friendly: bool,
    pub created_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<FoodRow> for Food {
    type Error = anyhow::Error;

    fn try_from(r: FoodRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            category: r.category.parse()?,
            name: r.name,
            serving_size: r.serving_size,
            serving_unit: r.serving_unit,
            nutrients: r.nutrients,
            kidney_friendly: r.kidney_friendly,
            created_by: r.created_by,
            created_at: r.created_at,
        })
    }
}
