use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::dto::Profile;
use crate::auth::{repo::USER_COLUMNS, repo_types::User};

/// Writes every profile column from `profile`; the caller has already merged
/// the patch into the stored values.
pub async fn update_profile(db: &PgPool, user_id: Uuid, profile: &Profile) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
           SET name = $2,
               age = $3,
               height_cm = $4,
               weight_kg = $5,
               ckd_stage = $6,
               medical_conditions = $7,
               on_dialysis = $8,
               has_diabetes = $9,
               has_hypertension = $10,
               updated_at = now()
         WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(profile.name.as_deref())
    .bind(profile.age)
    .bind(profile.height_cm)
    .bind(profile.weight_kg)
    .bind(profile.ckd_stage.map(|s| s.as_str()))
    .bind(&profile.medical_conditions)
    .bind(profile.on_dialysis)
    .bind(profile.has_diabetes)
    .bind(profile.has_hypertension)
    .fetch_one(db)
    .await
    .context("update user profile")?;
    Ok(user)
}
