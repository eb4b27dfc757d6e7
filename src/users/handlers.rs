use axum::{extract::State, routing::get, Json, Router};
use tracing::{info, instrument};

use super::{
    dto::{Profile, ProfilePatch, ProfileResponse},
    repo,
};
use crate::{
    auth::{repo_types::User, AuthUser},
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/users/profile", get(get_profile).put(update_profile))
}

fn to_response(user: &User) -> ProfileResponse {
    ProfileResponse {
        id: user.id,
        email: user.email.clone(),
        profile: Profile::from(user),
        updated_at: user.updated_at,
    }
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    Ok(Json(to_response(&user)))
}

#[instrument(skip(state, patch))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(patch): Json<ProfilePatch>,
) -> ApiResult<Json<ProfileResponse>> {
    patch.validate()?;
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    let merged = patch.apply(Profile::from(&user));
    let user = repo::update_profile(&state.db, user_id, &merged).await?;
    info!(%user_id, ckd_stage = ?merged.ckd_stage, "profile updated");
    Ok(Json(to_response(&user)))
}
