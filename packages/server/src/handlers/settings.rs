use axum::Json;
use axum::extract::State;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::instrument;

use crate::entity::setting;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::settings::{SettingsResponse, UpdateSettingsRequest, validate_update_settings};
use crate::settings::{SETTINGS_TAG, merged_settings};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Settings",
    operation_id = "getSiteSettings",
    summary = "Get the public site settings",
    description = "Returns stored values merged over the compiled-in defaults; a missing \
        or blank value falls back to its default. Served from a cache with a 5-minute TTL.",
    responses(
        (status = 200, description = "Merged settings", body = SettingsResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn get_site_settings(
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, AppError> {
    let stored = state.settings.load(&state.db).await?;
    Ok(Json(SettingsResponse {
        settings: merged_settings(&stored),
    }))
}

#[utoipa::path(
    get,
    path = "/raw",
    tag = "Settings",
    operation_id = "getRawSettings",
    summary = "Get the stored settings rows without defaults",
    responses(
        (status = 200, description = "Stored settings", body = SettingsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_raw_settings(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, AppError> {
    auth_user.require_permission("settings:edit")?;

    let rows = setting::Entity::find().all(&state.db).await?;
    Ok(Json(SettingsResponse {
        settings: rows.into_iter().map(|s| (s.key_name, s.value)).collect(),
    }))
}

#[utoipa::path(
    put,
    path = "/",
    tag = "Settings",
    operation_id = "updateSettings",
    summary = "Upsert site settings",
    description = "Upserts every submitted key in one transaction, then invalidates the \
        settings cache synchronously.",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Stored settings after the update", body = SettingsResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_settings(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, AppError> {
    auth_user.require_permission("settings:edit")?;
    validate_update_settings(&payload)?;

    let txn = state.db.begin().await?;
    for (key, value) in &payload.settings {
        let model = setting::ActiveModel {
            key_name: Set(key.clone()),
            value: Set(value.clone()),
        };
        setting::Entity::insert(model)
            .on_conflict(
                OnConflict::column(setting::Column::KeyName)
                    .update_column(setting::Column::Value)
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
    }
    txn.commit().await?;

    // The cache must never serve values older than this write.
    state.settings.invalidate(SETTINGS_TAG);

    let rows = setting::Entity::find().all(&state.db).await?;
    Ok(Json(SettingsResponse {
        settings: rows.into_iter().map(|s| (s.key_name, s.value)).collect(),
    }))
}
