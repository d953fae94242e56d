use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::inquiry;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::inquiry::{
    InquiryRequest, InquiryResponse, UpdateInquiryStatusRequest, validate_inquiry_request,
    validate_inquiry_status,
};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Inquiries",
    operation_id = "submitInquiry",
    summary = "Submit a contact-form inquiry",
    request_body = InquiryRequest,
    responses(
        (status = 201, description = "Inquiry recorded", body = InquiryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn submit_inquiry(
    State(state): State<AppState>,
    AppJson(payload): AppJson<InquiryRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_inquiry_request(&payload)?;

    let new_inquiry = inquiry::ActiveModel {
        full_name: Set(payload.name.trim().to_string()),
        email: Set(payload.email.trim().to_string()),
        phone: Set(payload.phone.trim().to_string()),
        company_name: Set(payload.company.clone()),
        message: Set(payload.message.trim().to_string()),
        status: Set("New".to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_inquiry.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(InquiryResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Inquiries",
    operation_id = "listInquiries",
    summary = "List inquiries, newest first",
    responses(
        (status = 200, description = "Inquiries", body = Vec<InquiryResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_inquiries(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<InquiryResponse>>, AppError> {
    auth_user.require_permission("inquiry:manage")?;

    let rows = inquiry::Entity::find()
        .order_by_desc(inquiry::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(InquiryResponse::from).collect()))
}

#[utoipa::path(
    put,
    path = "/{id}/status",
    tag = "Inquiries",
    operation_id = "updateInquiryStatus",
    summary = "Change an inquiry's triage status",
    params(("id" = i32, Path, description = "Inquiry ID")),
    request_body = UpdateInquiryStatusRequest,
    responses(
        (status = 200, description = "Inquiry updated", body = InquiryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Inquiry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_inquiry_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateInquiryStatusRequest>,
) -> Result<Json<InquiryResponse>, AppError> {
    auth_user.require_permission("inquiry:manage")?;
    validate_inquiry_status(&payload)?;

    let existing = find_inquiry(&state.db, id).await?;

    let mut active: inquiry::ActiveModel = existing.into();
    active.status = Set(payload.status.clone());

    let model = active.update(&state.db).await?;

    Ok(Json(InquiryResponse::from(model)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Inquiries",
    operation_id = "deleteInquiry",
    summary = "Delete an inquiry",
    params(("id" = i32, Path, description = "Inquiry ID")),
    responses(
        (status = 204, description = "Inquiry deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Inquiry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_inquiry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("inquiry:manage")?;

    find_inquiry(&state.db, id).await?;

    inquiry::Entity::delete_by_id(id).exec(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_inquiry<C: ConnectionTrait>(db: &C, id: i32) -> Result<inquiry::Model, AppError> {
    inquiry::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inquiry not found".into()))
}
