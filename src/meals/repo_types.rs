use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrients::NutrientVector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl TimeOfDay {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeOfDay {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "snack" => Ok(Self::Snack),
            other => anyhow::bail!("unknown time of day: {other}"),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MealRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub time_of_day: String,
    pub water_intake: f64,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Meal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub time_of_day: TimeOfDay,
    pub water_intake: f64,
    pub created_at: OffsetDateTime,
}

impl TryFrom<MealRow> for Meal {
    type Error = anyhow::Error;

    fn try_from(r: MealRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            time_of_day: r.time_of_day.parse()?,
            name: r.name,
            water_intake: r.water_intake,
            created_at: r.created_at,
        })
    }
}

/// One line of a meal joined against the catalog. `resolved_id` is NULL when
/// the food row is gone; nutrient columns are then coalesced to zero.
#[derive(Debug, Clone, FromRow)]
pub struct MealItemRow {
    pub position: i32,
    pub quantity: f64,
    pub food_id: Option<Uuid>,
    pub resolved_id: Option<Uuid>,
    pub food_name: Option<String>,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
    #[sqlx(flatten)]
    pub nutrients: NutrientVector,
}

/// A food reference in a meal with its per-serving nutrients, if it resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct MealItem {
    pub food_id: Option<Uuid>,
    pub food_name: Option<String>,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
    pub quantity: f64,
    pub nutrients: Option<NutrientVector>,
}

impl From<MealItemRow> for MealItem {
    fn from(r: MealItemRow) -> Self {
        Self {
            nutrients: r.resolved_id.map(|_| r.nutrients),
            food_id: r.food_id,
            food_name: r.food_name,
            serving_size: r.serving_size,
            serving_unit: r.serving_unit,
            quantity: r.quantity,
        }
    }
}
