use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::CkdStage;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub name: Option<String>,
    pub age: Option<i32>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub ckd_stage: Option<String>,
    pub medical_conditions: Vec<String>,
    pub on_dialysis: bool,
    pub has_diabetes: bool,
    pub has_hypertension: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Stage on file; unknown stored values read as no stage.
    pub fn stage(&self) -> Option<CkdStage> {
        self.ckd_stage.as_deref().and_then(|s| s.parse().ok())
    }
}
