use crate::{error::ApiError, nutrients::NutrientVector};

/// Folds one meal's nutrients into the stored day total.
///
/// A missing record is seeded with `delta`. Pure addition, so the final
/// total does not depend on the order meals are logged in.
pub fn accumulate(existing: Option<NutrientVector>, delta: NutrientVector) -> NutrientVector {
    existing.unwrap_or(NutrientVector::ZERO) + delta
}

/// `accumulate`, refusing totals that could not be stored and read back.
///
/// Day totals are never reduced, so an overflowing total would stay broken.
pub fn accumulate_checked(
    existing: Option<NutrientVector>,
    delta: NutrientVector,
) -> Result<NutrientVector, ApiError> {
    let total = accumulate(existing, delta);
    if delta.is_finite() && total.is_finite() {
        Ok(total)
    } else {
        Err(ApiError::BadRequest("meal nutrients are too large to log".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal(calories: f64, sodium: f64, water: f64) -> NutrientVector {
        NutrientVector {
            calories,
            sodium,
            water,
            ..NutrientVector::ZERO
        }
    }

    fn log_all(meals: &[NutrientVector]) -> NutrientVector {
        meals
            .iter()
            .fold(None, |acc, m| Some(accumulate(acc, *m)))
            .unwrap_or(NutrientVector::ZERO)
    }

    #[test]
    fn first_log_seeds_the_day() {
        let m = meal(300.0, 400.0, 250.0);
        assert_eq!(accumulate(None, m), m);
    }

    #[test]
    fn sequential_logs_add_up() {
        let total = log_all(&[meal(300.0, 0.0, 0.0), meal(200.0, 0.0, 0.0)]);
        assert_eq!(total.calories, 500.0);
    }

    #[test]
    fn order_and_grouping_do_not_matter() {
        let a = meal(300.0, 120.0, 250.0);
        let b = meal(450.0, 800.0, 0.0);
        let c = meal(125.0, 60.0, 500.0);

        let ab_then_c = accumulate(Some(log_all(&[a, b])), c);
        let c_then_ab = accumulate(Some(accumulate(None, c)), a + b);
        let reversed = log_all(&[c, b, a]);

        assert_eq!(ab_then_c, c_then_ab);
        assert_eq!(ab_then_c, reversed);
        assert_eq!(reversed.calories, 875.0);
        assert_eq!(reversed.water, 750.0);
    }

    #[test]
    fn no_clamping_above_target() {
        let huge = meal(0.0, NutrientVector::BASE.sodium * 3.0, 0.0);
        assert_eq!(accumulate(Some(huge), huge).sodium, 12000.0);
    }

    #[test]
    fn overflowing_total_is_rejected() {
        let day = meal(f64::MAX, 0.0, 0.0);
        let err = accumulate_checked(Some(day), day).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);

        let ok = accumulate_checked(Some(meal(300.0, 0.0, 0.0)), meal(200.0, 0.0, 0.0)).unwrap();
        assert_eq!(ok.calories, 500.0);
    }
}
