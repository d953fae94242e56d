use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::UploadCategory;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{product, project, service};
use crate::error::{AppError, ErrorBody, write_error};
use crate::extractors::auth::AuthUser;
use crate::extractors::form::ParsedForm;
use crate::models::service::{ServiceForm, ServiceResponse, validate_service_form};
use crate::mutation::slug::unique_slug;
use crate::mutation::uploads::{UploadBatch, discard_all, stored_ref};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Services",
    operation_id = "listServices",
    summary = "List active services",
    responses(
        (status = 200, description = "Active services", body = Vec<ServiceResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<Vec<ServiceResponse>>, AppError> {
    let rows = service::Entity::find()
        .filter(service::Column::IsActive.eq(true))
        .order_by_asc(service::Column::Title)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(ServiceResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/by-slug/{slug}",
    tag = "Services",
    operation_id = "getServiceBySlug",
    summary = "Get an active service by slug",
    params(("slug" = String, Path, description = "Service slug")),
    responses(
        (status = 200, description = "Service", body = ServiceResponse),
        (status = 404, description = "Service not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(slug))]
pub async fn get_service_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ServiceResponse>, AppError> {
    let model = service::Entity::find()
        .filter(service::Column::Slug.eq(&slug))
        .filter(service::Column::IsActive.eq(true))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".into()))?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/all",
    tag = "Services",
    operation_id = "listAllServices",
    summary = "List every service, inactive included",
    responses(
        (status = 200, description = "All services", body = Vec<ServiceResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_all_services(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ServiceResponse>>, AppError> {
    auth_user.require_any_permission(&["service:create", "service:edit"])?;

    let rows = service::Entity::find()
        .order_by_desc(service::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(ServiceResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Services",
    operation_id = "getService",
    summary = "Get a service by ID",
    params(("id" = i32, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service", body = ServiceResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Service not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_service(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ServiceResponse>, AppError> {
    auth_user.require_any_permission(&["service:create", "service:edit"])?;

    let model = find_service(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Services",
    operation_id = "createService",
    summary = "Create a service",
    description = "Creates a service from a multipart form. The optional `hero_image` file \
        is stored first and discarded again if the database write fails.",
    request_body(content_type = "multipart/form-data", description = "Service fields plus optional hero_image"),
    responses(
        (status = 201, description = "Service created", body = ServiceResponse),
        (status = 400, description = "Validation or upload error", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Slug already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn create_service(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("service:create")?;

    let mut form = ParsedForm::read(&mut multipart).await?;
    let payload = ServiceForm::from_form(&mut form)?;
    validate_service_form(&payload)?;

    let slug = unique_slug::<service::Entity, _>(
        &state.db,
        service::Column::Slug,
        payload.slug.clone(),
        &payload.title,
    )
    .await?;

    let mut batch = UploadBatch::new(&*state.uploads);
    let hero = match &payload.hero_image {
        Some(file) => Some(
            batch
                .stage(file, UploadCategory::Services, "hero image")
                .await?,
        ),
        None => None,
    };

    let now = chrono::Utc::now();
    let new_service = service::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        slug: Set(slug),
        description: Set(payload.description.clone()),
        meta_description: Set(payload.meta_description.clone()),
        hero_image: Set(hero.as_ref().map(|r| r.as_url())),
        is_active: Set(payload.is_active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let (model, _committed) = batch
        .commit_with(async { new_service.insert(&state.db).await.map_err(write_error) })
        .await?;

    Ok((StatusCode::CREATED, Json(ServiceResponse::from(model))))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Services",
    operation_id = "updateService",
    summary = "Update a service",
    description = "Replaces the service's fields. A newly uploaded `hero_image` supersedes \
        the old one, which is deleted only after the database write commits.",
    params(("id" = i32, Path, description = "Service ID")),
    request_body(content_type = "multipart/form-data", description = "Service fields plus optional hero_image"),
    responses(
        (status = 200, description = "Service updated", body = ServiceResponse),
        (status = 400, description = "Validation or upload error", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Service not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Slug already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(id))]
pub async fn update_service(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<ServiceResponse>, AppError> {
    auth_user.require_permission("service:edit")?;

    let mut form = ParsedForm::read(&mut multipart).await?;
    let payload = ServiceForm::from_form(&mut form)?;
    validate_service_form(&payload)?;

    let existing = find_service(&state.db, id).await?;

    let mut batch = UploadBatch::new(&*state.uploads);
    let new_hero = match &payload.hero_image {
        Some(file) => Some(
            batch
                .stage(file, UploadCategory::Services, "hero image")
                .await?,
        ),
        None => None,
    };

    let mut old_refs = Vec::new();
    if new_hero.is_some()
        && let Some(ref old) = existing.hero_image
        && let Some(reference) = stored_ref(old)
    {
        old_refs.push(reference);
    }

    let mut active: service::ActiveModel = existing.into();
    active.title = Set(payload.title.trim().to_string());
    if let Some(ref slug) = payload.slug {
        active.slug = Set(slug.clone());
    }
    active.description = Set(payload.description.clone());
    active.meta_description = Set(payload.meta_description.clone());
    if let Some(ref hero) = new_hero {
        active.hero_image = Set(Some(hero.as_url()));
    }
    active.is_active = Set(payload.is_active);
    active.updated_at = Set(chrono::Utc::now());

    let (model, committed) = batch
        .commit_with(async { active.update(&state.db).await.map_err(write_error) })
        .await?;
    committed.release(old_refs).await;

    Ok(Json(ServiceResponse::from(model)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Services",
    operation_id = "deleteService",
    summary = "Delete a service",
    description = "Deletes the service and its stored hero image. Returns 409 CONFLICT if \
        any product still belongs to it; projects keep their rows and lose the reference.",
    params(("id" = i32, Path, description = "Service ID")),
    responses(
        (status = 204, description = "Service deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Service not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Service still has products (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_service(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("service:delete")?;

    let existing = find_service(&state.db, id).await?;

    let product_count = product::Entity::find()
        .filter(product::Column::ServiceId.eq(id))
        .count(&state.db)
        .await?;
    if product_count > 0 {
        return Err(AppError::Conflict(
            "Cannot delete a service that still has products".into(),
        ));
    }

    if let Some(reference) = existing.hero_image.as_deref().and_then(stored_ref) {
        discard_all(&*state.uploads, vec![reference]).await;
    }

    let txn = state.db.begin().await?;
    project::Entity::update_many()
        .col_expr(project::Column::ServiceId, Expr::value(Option::<i32>::None))
        .filter(project::Column::ServiceId.eq(id))
        .exec(&txn)
        .await?;
    service::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_service<C: ConnectionTrait>(db: &C, id: i32) -> Result<service::Model, AppError> {
    service::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".into()))
}
