use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::CkdStage;
use crate::{auth::repo_types::User, error::ApiError};

/// Demographic and clinical fields of a user.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: Option<String>,
    pub age: Option<i32>,
    #[serde(rename = "height")]
    pub height_cm: Option<f64>,
    #[serde(rename = "weight")]
    pub weight_kg: Option<f64>,
    pub ckd_stage: Option<CkdStage>,
    pub medical_conditions: Vec<String>,
    pub on_dialysis: bool,
    pub has_diabetes: bool,
    pub has_hypertension: bool,
}

impl From<&User> for Profile {
    fn from(u: &User) -> Self {
        Self {
            name: u.name.clone(),
            age: u.age,
            height_cm: u.height_cm,
            weight_kg: u.weight_kg,
            ckd_stage: u.stage(),
            medical_conditions: u.medical_conditions.clone(),
            on_dialysis: u.on_dialysis,
            has_diabetes: u.has_diabetes,
            has_hypertension: u.has_hypertension,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    #[serde(flatten)]
    pub profile: Profile,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Absent → `None`, explicit `null` → `Some(None)`.
fn nullable<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

/// Field mask for `PUT /users/profile`. Only the listed fields can change.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfilePatch {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub age: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", rename = "height")]
    pub height_cm: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable", rename = "weight")]
    pub weight_kg: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub ckd_stage: Option<Option<CkdStage>>,
    pub medical_conditions: Option<Vec<String>>,
    pub on_dialysis: Option<bool>,
    pub has_diabetes: Option<bool>,
    pub has_hypertension: Option<bool>,
}

impl ProfilePatch {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(Some(age)) = self.age {
            if !(0..=130).contains(&age) {
                return Err(ApiError::BadRequest("age must be between 0 and 130".into()));
            }
        }
        for (label, value) in [("height", self.height_cm), ("weight", self.weight_kg)] {
            if let Some(Some(v)) = value {
                if !(v > 0.0 && v.is_finite()) {
                    return Err(ApiError::BadRequest(format!("{label} must be positive")));
                }
            }
        }
        Ok(())
    }

    pub fn apply(self, mut profile: Profile) -> Profile {
        if let Some(name) = self.name {
            profile.name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        }
        if let Some(age) = self.age {
            profile.age = age;
        }
        if let Some(h) = self.height_cm {
            profile.height_cm = h;
        }
        if let Some(w) = self.weight_kg {
            profile.weight_kg = w;
        }
        if let Some(stage) = self.ckd_stage {
            profile.ckd_stage = stage;
        }
        if let Some(conditions) = self.medical_conditions {
            profile.medical_conditions = conditions
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
        }
        if let Some(v) = self.on_dialysis {
            profile.on_dialysis = v;
        }
        if let Some(v) = self.has_diabetes {
            profile.has_diabetes = v;
        }
        if let Some(v) = self.has_hypertension {
            profile.has_hypertension = v;
        }
        profile
    }
}
