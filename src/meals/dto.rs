use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Meal, MealItem, TimeOfDay};
use super::services::compute_meal_nutrients;
use crate::{error::ApiError, nutrients::NutrientVector};

/// Servings of one food in a single meal.
pub const MAX_QUANTITY: f64 = 1_000.0;
/// Millilitres of water logged with a single meal.
pub const MAX_WATER_INTAKE: f64 = 20_000.0;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealFoodInput {
    pub food_id: Uuid,
    pub quantity: f64,
}

impl MealFoodInput {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.quantity > 0.0 && self.quantity <= MAX_QUANTITY {
            Ok(())
        } else {
            Err(ApiError::BadRequest(format!(
                "quantity must be positive and at most {MAX_QUANTITY}"
            )))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealRequest {
    pub name: String,
    pub time_of_day: TimeOfDay,
    #[serde(default)]
    pub water_intake: f64,
    #[serde(default)]
    pub foods: Vec<MealFoodInput>,
}

impl CreateMealRequest {
    pub fn validate(&mut self) -> Result<(), ApiError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(ApiError::BadRequest("name is required".into()));
        }
        if !(0.0..=MAX_WATER_INTAKE).contains(&self.water_intake) {
            return Err(ApiError::BadRequest(format!(
                "waterIntake must be between 0 and {MAX_WATER_INTAKE}"
            )));
        }
        self.foods.iter().try_for_each(MealFoodInput::validate)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealFoodResponse {
    pub food_id: Option<Uuid>,
    pub name: Option<String>,
    pub quantity: f64,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
    /// Per-serving nutrients; absent when the food no longer resolves.
    pub nutrients: Option<NutrientVector>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealResponse {
    pub id: Uuid,
    pub name: String,
    pub time_of_day: TimeOfDay,
    pub water_intake: f64,
    pub foods: Vec<MealFoodResponse>,
    pub total_nutrients: NutrientVector,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl MealResponse {
    pub fn new(meal: Meal, items: Vec<MealItem>) -> Self {
        let total_nutrients = compute_meal_nutrients(&items, meal.water_intake);
        Self {
            id: meal.id,
            name: meal.name,
            time_of_day: meal.time_of_day,
            water_intake: meal.water_intake,
            foods: items
                .into_iter()
                .map(|i| MealFoodResponse {
                    food_id: i.food_id,
                    name: i.food_name,
                    quantity: i.quantity,
                    serving_size: i.serving_size,
                    serving_unit: i.serving_unit,
                    nutrients: i.nutrients,
                })
                .collect(),
            total_nutrients,
            created_at: meal.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealListItem {
    pub id: Uuid,
    pub name: String,
    pub time_of_day: TimeOfDay,
    pub water_intake: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Meal> for MealListItem {
    fn from(m: Meal) -> Self {
        Self {
            id: m.id,
            name: m.name,
            time_of_day: m.time_of_day,
            water_intake: m.water_intake,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl Pagination {
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 100), self.offset.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults() {
        let mut req: CreateMealRequest =
            serde_json::from_str(r#"{"name":" Lunch ","timeOfDay":"lunch"}"#).unwrap();
        req.validate().unwrap();
        assert_eq!(req.name, "Lunch");
        assert_eq!(req.water_intake, 0.0);
        assert!(req.foods.is_empty());
    }

    #[test]
    fn create_request_rejects_bad_quantities_and_water() {
        let id = Uuid::new_v4();
        let mut req: CreateMealRequest = serde_json::from_str(&format!(
            r#"{{"name":"x","timeOfDay":"dinner","foods":[{{"foodId":"{id}","quantity":0}}]}}"#
        ))
        .unwrap();
        assert!(req.validate().is_err());

        let mut req: CreateMealRequest =
            serde_json::from_str(r#"{"name":"x","timeOfDay":"dinner","waterIntake":-5}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn oversized_quantity_and_water_are_rejected() {
        let food = MealFoodInput {
            food_id: Uuid::new_v4(),
            quantity: 1e308,
        };
        assert!(food.validate().is_err());
        assert!(MealFoodInput { quantity: MAX_QUANTITY, ..food }.validate().is_ok());

        let mut req: CreateMealRequest =
            serde_json::from_str(r#"{"name":"x","timeOfDay":"snack","waterIntake":1e308}"#).unwrap();
        let err = req.validate().unwrap_err();
        assert!(err.to_string().starts_with("waterIntake"));
    }

    #[test]
    fn unknown_time_of_day_fails_to_parse() {
        assert!(serde_json::from_str::<CreateMealRequest>(r#"{"name":"x","timeOfDay":"brunch"}"#)
            .is_err());
    }

    #[test]
    fn response_totals_come_from_items() {
        let meal = Meal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Dinner".into(),
            time_of_day: TimeOfDay::Dinner,
            water_intake: 200.0,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let chicken = MealItem {
            food_id: Some(Uuid::new_v4()),
            food_name: Some("Chicken".into()),
            serving_size: Some(100.0),
            serving_unit: Some("g".into()),
            quantity: 1.5,
            nutrients: Some(NutrientVector {
                calories: 165.0,
                ..NutrientVector::ZERO
            }),
        };
        let res = MealResponse::new(meal, vec![chicken]);
        let v = serde_json::to_value(&res).unwrap();
        assert_eq!(v["totalNutrients"]["calories"], 247.5);
        assert_eq!(v["totalNutrients"]["water"], 200.0);
        assert_eq!(v["foods"][0]["name"], "Chicken");
        assert_eq!(v["timeOfDay"], "dinner");
    }

    #[test]
    fn pagination_clamps() {
        let p = Pagination { limit: 0, offset: -1 };
        assert_eq!(p.clamped(), (1, 0));
    }
}
