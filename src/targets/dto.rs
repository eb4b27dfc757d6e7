use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::services::GenerationMethod;
use crate::nutrients::{NutrientPatch, NutrientVector};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDietChartRequest {
    pub method: GenerationMethod,
    pub age: Option<i32>,
    /// Only read for `CUSTOM`.
    pub values: Option<NutrientPatch>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientTargetResponse {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub nutrients: NutrientVector,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DietChartResponse {
    pub method: GenerationMethod,
    pub targets: NutrientTargetResponse,
}
