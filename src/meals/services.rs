use crate::nutrients::NutrientVector;

use super::repo_types::MealItem;

/// Nutrients contributed by one meal.
///
/// Every field except water is the sum of per-serving food nutrients times
/// quantity. Water is the meal's own logged water intake; water carried by
/// the foods themselves is not added. Unresolved foods contribute zero. No
/// rounding is applied.
pub fn compute_meal_nutrients(items: &[MealItem], water_intake: f64) -> NutrientVector {
    let mut total: NutrientVector = items
        .iter()
        .filter_map(|item| item.nutrients.map(|n| n.scaled(item.quantity)))
        .sum();
    total.water = water_intake;
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrients::NutrientField;
    use uuid::Uuid;

    fn item(nutrients: Option<NutrientVector>, quantity: f64) -> MealItem {
        MealItem {
            food_id: Some(Uuid::new_v4()),
            food_name: None,
            serving_size: Some(100.0),
            serving_unit: Some("g".into()),
            quantity,
            nutrients,
        }
    }

    fn food(calories: f64, water: f64) -> NutrientVector {
        NutrientVector {
            calories,
            water,
            ..NutrientVector::ZERO
        }
    }

    #[test]
    fn chicken_and_rice() {
        let items = [item(Some(food(165.0, 65.0)), 1.5), item(Some(food(111.0, 70.0)), 1.0)];
        let n = compute_meal_nutrients(&items, 200.0);
        assert_eq!(n.calories, 358.5);
        assert_eq!(n.water, 200.0);
    }

    #[test]
    fn every_scalable_field_is_linear() {
        let a = NutrientVector::BASE;
        let b = NutrientVector::BASE.scaled(0.25);
        let items = [item(Some(a), 2.0), item(Some(b), 3.0)];
        let n = compute_meal_nutrients(&items, 0.0);
        for field in NutrientField::ALL {
            if field == NutrientField::Water {
                assert_eq!(n.get(field), 0.0);
            } else {
                assert_eq!(n.get(field), a.get(field) * 2.0 + b.get(field) * 3.0);
            }
        }
    }

    #[test]
    fn unresolved_food_contributes_zero() {
        let items = [item(None, 4.0), item(Some(food(100.0, 0.0)), 1.0)];
        let n = compute_meal_nutrients(&items, 50.0);
        assert_eq!(n.calories, 100.0);
        assert_eq!(n.water, 50.0);
    }

    #[test]
    fn empty_meal_is_water_only() {
        let n = compute_meal_nutrients(&[], 330.0);
        assert_eq!(
            n,
            NutrientVector {
                water: 330.0,
                ..NutrientVector::ZERO
            }
        );
    }
}
