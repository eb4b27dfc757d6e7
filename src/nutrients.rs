use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::ApiError;

/// Largest amount accepted for a single nutrient field from clients.
pub const MAX_AMOUNT: f64 = 1_000_000.0;

fn in_range(v: f64) -> bool {
    (0.0..=MAX_AMOUNT).contains(&v)
}

fn out_of_range(field: NutrientField) -> ApiError {
    ApiError::BadRequest(format!(
        "{} must be a number between 0 and {MAX_AMOUNT}",
        field.as_str()
    ))
}

/// The ten nutrient quantities tracked for foods, meals, days and targets.
///
/// Units: protein/carbohydrates/fats in g, calories in kcal,
/// minerals in mg, water in ml.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct NutrientVector {
    pub protein: f64,
    pub calories: f64,
    pub carbohydrates: f64,
    pub fats: f64,
    pub potassium: f64,
    pub phosphorus: f64,
    pub sodium: f64,
    pub calcium: f64,
    pub magnesium: f64,
    pub water: f64,
}

impl NutrientVector {
    pub const ZERO: Self = Self {
        protein: 0.0,
        calories: 0.0,
        carbohydrates: 0.0,
        fats: 0.0,
        potassium: 0.0,
        phosphorus: 0.0,
        sodium: 0.0,
        calcium: 0.0,
        magnesium: 0.0,
        water: 0.0,
    };

    /// Daily defaults used whenever no more specific target applies.
    pub const BASE: Self = Self {
        protein: 60.0,
        calories: 2000.0,
        carbohydrates: 300.0,
        fats: 65.0,
        potassium: 2000.0,
        phosphorus: 800.0,
        sodium: 2000.0,
        calcium: 1000.0,
        magnesium: 300.0,
        water: 2000.0,
    };

    /// Every field multiplied by `quantity`.
    pub fn scaled(&self, quantity: f64) -> Self {
        let mut out = *self;
        for field in NutrientField::ALL {
            *out.get_mut(field) *= quantity;
        }
        out
    }

    pub fn get(&self, field: NutrientField) -> f64 {
        match field {
            NutrientField::Protein => self.protein,
            NutrientField::Calories => self.calories,
            NutrientField::Carbohydrates => self.carbohydrates,
            NutrientField::Fats => self.fats,
            NutrientField::Potassium => self.potassium,
            NutrientField::Phosphorus => self.phosphorus,
            NutrientField::Sodium => self.sodium,
            NutrientField::Calcium => self.calcium,
            NutrientField::Magnesium => self.magnesium,
            NutrientField::Water => self.water,
        }
    }

    pub fn get_mut(&mut self, field: NutrientField) -> &mut f64 {
        match field {
            NutrientField::Protein => &mut self.protein,
            NutrientField::Calories => &mut self.calories,
            NutrientField::Carbohydrates => &mut self.carbohydrates,
            NutrientField::Fats => &mut self.fats,
            NutrientField::Potassium => &mut self.potassium,
            NutrientField::Phosphorus => &mut self.phosphorus,
            NutrientField::Sodium => &mut self.sodium,
            NutrientField::Calcium => &mut self.calcium,
            NutrientField::Magnesium => &mut self.magnesium,
            NutrientField::Water => &mut self.water,
        }
    }

    /// First field that is negative, non-finite or above `MAX_AMOUNT`.
    pub fn first_invalid(&self) -> Option<NutrientField> {
        NutrientField::ALL
            .into_iter()
            .find(|f| !in_range(self.get(*f)))
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        match self.first_invalid() {
            Some(field) => Err(out_of_range(field)),
            None => Ok(()),
        }
    }

    pub fn is_finite(&self) -> bool {
        NutrientField::ALL
            .into_iter()
            .all(|f| self.get(f).is_finite())
    }
}

impl Add for NutrientVector {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for NutrientVector {
    fn add_assign(&mut self, rhs: Self) {
        for field in NutrientField::ALL {
            *self.get_mut(field) += rhs.get(field);
        }
    }
}

impl Sum for NutrientVector {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NutrientField {
    Protein,
    Calories,
    Carbohydrates,
    Fats,
    Potassium,
    Phosphorus,
    Sodium,
    Calcium,
    Magnesium,
    Water,
}

impl NutrientField {
    pub const ALL: [Self; 10] = [
        Self::Protein,
        Self::Calories,
        Self::Carbohydrates,
        Self::Fats,
        Self::Potassium,
        Self::Phosphorus,
        Self::Sodium,
        Self::Calcium,
        Self::Magnesium,
        Self::Water,
    ];

    /// Column and JSON name; the two agree for every field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Protein => "protein",
            Self::Calories => "calories",
            Self::Carbohydrates => "carbohydrates",
            Self::Fats => "fats",
            Self::Potassium => "potassium",
            Self::Phosphorus => "phosphorus",
            Self::Sodium => "sodium",
            Self::Calcium => "calcium",
            Self::Magnesium => "magnesium",
            Self::Water => "water",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }
}

/// Field mask over [`NutrientVector`]: only the fields present are written.
/// Keys that are not nutrient names are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientPatch {
    pub protein: Option<f64>,
    pub calories: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub fats: Option<f64>,
    pub potassium: Option<f64>,
    pub phosphorus: Option<f64>,
    pub sodium: Option<f64>,
    pub calcium: Option<f64>,
    pub magnesium: Option<f64>,
    pub water: Option<f64>,
}

impl NutrientPatch {
    fn get(&self, field: NutrientField) -> Option<f64> {
        match field {
            NutrientField::Protein => self.protein,
            NutrientField::Calories => self.calories,
            NutrientField::Carbohydrates => self.carbohydrates,
            NutrientField::Fats => self.fats,
            NutrientField::Potassium => self.potassium,
            NutrientField::Phosphorus => self.phosphorus,
            NutrientField::Sodium => self.sodium,
            NutrientField::Calcium => self.calcium,
            NutrientField::Magnesium => self.magnesium,
            NutrientField::Water => self.water,
        }
    }

    pub fn is_empty(&self) -> bool {
        NutrientField::ALL.into_iter().all(|f| self.get(f).is_none())
    }

    pub fn apply(&self, base: NutrientVector) -> NutrientVector {
        let mut out = base;
        for field in NutrientField::ALL {
            if let Some(v) = self.get(field) {
                *out.get_mut(field) = v;
            }
        }
        out
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        for field in NutrientField::ALL {
            if let Some(v) = self.get(field) {
                if !in_range(v) {
                    return Err(out_of_range(field));
                }
            }
        }
        Ok(())
    }
}

/// Intake measured against a target. Computed on read, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientProgress {
    /// Percent of target per field, rounded to one decimal. A zero target
    /// reports 0 for zero intake and 100 otherwise.
    pub percent: NutrientVector,
    pub exceeded: Vec<NutrientField>,
}

impl NutrientProgress {
    pub fn measure(intake: &NutrientVector, target: &NutrientVector) -> Self {
        let mut percent = NutrientVector::ZERO;
        let mut exceeded = Vec::new();
        for field in NutrientField::ALL {
            let (have, goal) = (intake.get(field), target.get(field));
            let pct = if goal > 0.0 {
                (have / goal * 1000.0).round() / 10.0
            } else if have > 0.0 {
                100.0
            } else {
                0.0
            };
            *percent.get_mut(field) = pct;
            if have > goal {
                exceeded.push(field);
            }
        }
        Self { percent, exceeded }
    }
}
