use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{DietChartResponse, GenerateDietChartRequest, NutrientTargetResponse},
    repo::{self, NutrientTarget},
    services::{derive_target, GenerationMethod, TargetBasis},
};
use crate::{
    auth::{repo_types::User, AuthUser},
    error::{ApiError, ApiResult},
    nutrients::NutrientPatch,
    state::AppState,
};

pub fn target_routes() -> Router<AppState> {
    Router::new()
        .route("/nutrient-targets", get(get_targets).put(update_targets))
        .route("/generate-diet-chart", post(generate_diet_chart))
}

impl From<NutrientTarget> for NutrientTargetResponse {
    fn from(t: NutrientTarget) -> Self {
        Self {
            user_id: t.user_id,
            nutrients: t.nutrients,
            last_updated: t.updated_at,
        }
    }
}

#[instrument(skip(state))]
pub async fn get_targets(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<NutrientTargetResponse>> {
    let target = repo::get_or_create(&state.db, user_id).await?;
    Ok(Json(target.into()))
}

/// Merges the supplied fields into the stored target.
#[instrument(skip(state, patch))]
pub async fn update_targets(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(patch): Json<NutrientPatch>,
) -> ApiResult<Json<NutrientTargetResponse>> {
    if patch.is_empty() {
        return Err(ApiError::BadRequest("no nutrient fields supplied".into()));
    }
    patch.validate()?;

    let mut tx = state.db.begin().await?;
    let current = repo::lock_tx(&mut tx, user_id).await?;
    let updated = repo::replace(&mut *tx, user_id, &patch.apply(current.nutrients)).await?;
    tx.commit().await?;

    info!(%user_id, "nutrient targets updated");
    Ok(Json(updated.into()))
}

fn resolve_basis(req: &GenerateDietChartRequest, user: &User) -> ApiResult<TargetBasis> {
    Ok(match req.method {
        GenerationMethod::Custom => {
            let values = req
                .values
                .ok_or_else(|| ApiError::BadRequest("values are required for CUSTOM".into()))?;
            values.validate()?;
            TargetBasis::Custom(values)
        }
        GenerationMethod::AgeBased => {
            if let Some(age) = req.age {
                if !(0..=130).contains(&age) {
                    return Err(ApiError::BadRequest("age must be between 0 and 130".into()));
                }
            }
            TargetBasis::Age(req.age.or(user.age))
        }
        GenerationMethod::CkdStage => TargetBasis::Stage(user.stage()),
    })
}

#[instrument(skip(state, body))]
pub async fn generate_diet_chart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<GenerateDietChartRequest>,
) -> ApiResult<Json<DietChartResponse>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    let basis = resolve_basis(&body, &user)?;
    match &basis {
        TargetBasis::Age(None) => warn!(%user_id, "no age on file; using base targets"),
        TargetBasis::Stage(None) => warn!(%user_id, "no CKD stage on file; using base targets"),
        _ => {}
    }

    let target = derive_target(&basis);
    let saved = repo::replace(&state.db, user_id, &target).await?;
    info!(%user_id, method = ?basis.method(), "diet chart generated");

    Ok(Json(DietChartResponse {
        method: basis.method(),
        targets: saved.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrients::NutrientVector;
    use crate::users::CkdStage;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn user(age: Option<i32>, stage: Option<CkdStage>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "pat@example.com".into(),
            password_hash: String::new(),
            name: None,
            age,
            height_cm: None,
            weight_kg: None,
            ckd_stage: stage.map(|s| s.as_str().to_string()),
            medical_conditions: Vec::new(),
            on_dialysis: false,
            has_diabetes: false,
            has_hypertension: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn request(method: GenerationMethod, age: Option<i32>) -> GenerateDietChartRequest {
        GenerateDietChartRequest {
            method,
            age,
            values: None,
        }
    }

    #[test]
    fn ckd_stage_comes_from_profile() {
        let basis = resolve_basis(
            &request(GenerationMethod::CkdStage, None),
            &user(None, Some(CkdStage::Stage3)),
        )
        .unwrap();
        assert_eq!(basis, TargetBasis::Stage(Some(CkdStage::Stage3)));
        assert_eq!(derive_target(&basis).sodium, 1500.0);
    }

    #[test]
    fn body_age_wins_over_profile_age() {
        let u = user(Some(62), None);
        let basis = resolve_basis(&request(GenerationMethod::AgeBased, Some(25)), &u).unwrap();
        assert_eq!(basis, TargetBasis::Age(Some(25)));
        let basis = resolve_basis(&request(GenerationMethod::AgeBased, None), &u).unwrap();
        assert_eq!(basis, TargetBasis::Age(Some(62)));
    }

    #[test]
    fn missing_stage_falls_back_silently() {
        let basis =
            resolve_basis(&request(GenerationMethod::CkdStage, None), &user(None, None)).unwrap();
        assert_eq!(derive_target(&basis), NutrientVector::BASE);
    }

    #[test]
    fn unknown_stored_stage_reads_as_none() {
        let mut u = user(None, None);
        u.ckd_stage = Some("STAGE_9".into());
        let basis = resolve_basis(&request(GenerationMethod::CkdStage, None), &u).unwrap();
        assert_eq!(basis, TargetBasis::Stage(None));
    }

    #[test]
    fn custom_requires_valid_values() {
        let u = user(None, None);
        assert!(resolve_basis(&request(GenerationMethod::Custom, None), &u).is_err());

        let mut req = request(GenerationMethod::Custom, None);
        req.values = Some(NutrientPatch {
            sodium: Some(-10.0),
            ..Default::default()
        });
        assert!(resolve_basis(&req, &u).is_err());
    }

    #[test]
    fn out_of_range_age_is_rejected() {
        let err = resolve_basis(&request(GenerationMethod::AgeBased, Some(-3)), &user(None, None))
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn empty_or_out_of_range_patch_is_rejected_before_any_write() {
        let state = AppState::fake();
        let err = update_targets(
            State(state.clone()),
            AuthUser(Uuid::new_v4()),
            Json(NutrientPatch::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);

        let patch: NutrientPatch = serde_json::from_str(r#"{"sodium":1e308}"#).unwrap();
        let err = update_targets(State(state), AuthUser(Uuid::new_v4()), Json(patch))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("sodium"));
    }
}
