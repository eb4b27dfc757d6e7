//! Diet-chart derivation: a pure mapping from a generation method and the
//! user's attributes to a daily nutrient target.
//!
//! Each method layers a fixed override record on top of
//! [`NutrientVector::BASE`]. The tables are `match` expressions over closed
//! enums so every bracket and stage is covered exhaustively.

use serde::{Deserialize, Serialize};

use crate::{
    nutrients::{NutrientPatch, NutrientVector},
    users::CkdStage,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationMethod {
    #[serde(alias = "custom")]
    Custom,
    #[serde(alias = "age", alias = "age_based")]
    AgeBased,
    #[serde(alias = "ckd", alias = "ckd_stage")]
    CkdStage,
}

/// Half-open age brackets: `[0, 30)`, `[30, 50)`, `[50, ∞)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBracket {
    Under30,
    From30To49,
    From50,
}

impl AgeBracket {
    pub fn of(age: i32) -> Self {
        match age {
            a if a < 30 => Self::Under30,
            a if a < 50 => Self::From30To49,
            _ => Self::From50,
        }
    }

    fn overrides(self) -> NutrientPatch {
        let (protein, calories, water) = match self {
            Self::Under30 => (70.0, 2200.0, 2500.0),
            Self::From30To49 => (65.0, 2100.0, 2200.0),
            Self::From50 => (60.0, 1900.0, 2000.0),
        };
        NutrientPatch {
            protein: Some(protein),
            calories: Some(calories),
            water: Some(water),
            ..Default::default()
        }
    }
}

/// Protein, potassium, phosphorus and sodium allowances per stage. Never
/// increase with stage.
fn stage_overrides(stage: CkdStage) -> NutrientPatch {
    let (protein, potassium, phosphorus, sodium) = match stage {
        CkdStage::Stage1 => (70.0, 2500.0, 1000.0, 2000.0),
        CkdStage::Stage2 => (65.0, 2300.0, 900.0, 1800.0),
        CkdStage::Stage3 => (60.0, 2000.0, 800.0, 1500.0),
        CkdStage::Stage4 => (50.0, 1800.0, 700.0, 1500.0),
        CkdStage::Stage5 => (40.0, 1500.0, 600.0, 1500.0),
    };
    NutrientPatch {
        protein: Some(protein),
        potassium: Some(potassium),
        phosphorus: Some(phosphorus),
        sodium: Some(sodium),
        ..Default::default()
    }
}

/// Resolved inputs for one derivation.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetBasis {
    Custom(NutrientPatch),
    Age(Option<i32>),
    Stage(Option<CkdStage>),
}

impl TargetBasis {
    pub fn method(&self) -> GenerationMethod {
        match self {
            Self::Custom(_) => GenerationMethod::Custom,
            Self::Age(_) => GenerationMethod::AgeBased,
            Self::Stage(_) => GenerationMethod::CkdStage,
        }
    }
}

/// Target vector for `basis`. A missing age or stage yields the base vector.
pub fn derive_target(basis: &TargetBasis) -> NutrientVector {
    let patch = match basis {
        TargetBasis::Custom(values) => *values,
        TargetBasis::Age(Some(age)) => AgeBracket::of(*age).overrides(),
        TargetBasis::Stage(Some(stage)) => stage_overrides(*stage),
        TargetBasis::Age(None) | TargetBasis::Stage(None) => NutrientPatch::default(),
    };
    patch.apply(NutrientVector::BASE)
}
