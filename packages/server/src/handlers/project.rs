use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::UploadCategory;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{client, project, service};
use crate::error::{AppError, ErrorBody, write_error};
use crate::extractors::auth::AuthUser;
use crate::extractors::form::ParsedForm;
use crate::models::project::{ProjectForm, ProjectResponse, validate_project_form};
use crate::mutation::slug::unique_slug;
use crate::mutation::uploads::{UploadBatch, discard_all, stored_ref};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Projects",
    operation_id = "listProjects",
    summary = "List portfolio projects",
    responses(
        (status = 200, description = "Projects, newest first", body = Vec<ProjectResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, AppError> {
    let rows = project::Entity::find()
        .order_by_desc(project::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(ProjectResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/by-slug/{slug}",
    tag = "Projects",
    operation_id = "getProjectBySlug",
    summary = "Get a project by slug",
    params(("slug" = String, Path, description = "Project slug")),
    responses(
        (status = 200, description = "Project", body = ProjectResponse),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(slug))]
pub async fn get_project_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProjectResponse>, AppError> {
    let model = project::Entity::find()
        .filter(project::Column::Slug.eq(&slug))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Projects",
    operation_id = "getProject",
    summary = "Get a project by ID",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project", body = ProjectResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProjectResponse>, AppError> {
    auth_user.require_any_permission(&["project:create", "project:edit"])?;

    let model = find_project(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Projects",
    operation_id = "createProject",
    summary = "Create a portfolio project",
    description = "Creates a project from a multipart form. The optional `thumbnail` file \
        is stored first and discarded again if the database write fails.",
    request_body(content_type = "multipart/form-data", description = "Project fields plus optional thumbnail"),
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Validation or upload error", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Client or service not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Slug already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn create_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("project:create")?;

    let mut form = ParsedForm::read(&mut multipart).await?;
    let payload = ProjectForm::from_form(&mut form)?;
    validate_project_form(&payload)?;

    check_relations(&state.db, &payload).await?;

    let slug = unique_slug::<project::Entity, _>(
        &state.db,
        project::Column::Slug,
        payload.slug.clone(),
        &payload.title,
    )
    .await?;

    let mut batch = UploadBatch::new(&*state.uploads);
    let thumbnail = match &payload.thumbnail {
        Some(file) => Some(
            batch
                .stage(file, UploadCategory::Projects, "thumbnail")
                .await?,
        ),
        None => None,
    };

    let now = chrono::Utc::now();
    let new_project = project::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        slug: Set(slug),
        client_id: Set(payload.client_id),
        service_id: Set(payload.service_id),
        description: Set(payload.description.clone()),
        project_date: Set(payload.project_date),
        status: Set(payload.status.clone()),
        thumbnail: Set(thumbnail.as_ref().map(|r| r.as_url())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let (model, _committed) = batch
        .commit_with(async { new_project.insert(&state.db).await.map_err(write_error) })
        .await?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(model))))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Projects",
    operation_id = "updateProject",
    summary = "Update a portfolio project",
    description = "Replaces the project's fields. A newly uploaded `thumbnail` supersedes \
        the old one, which is deleted only after the database write commits.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body(content_type = "multipart/form-data", description = "Project fields plus optional thumbnail"),
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 400, description = "Validation or upload error", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Slug already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(id))]
pub async fn update_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<ProjectResponse>, AppError> {
    auth_user.require_permission("project:edit")?;

    let mut form = ParsedForm::read(&mut multipart).await?;
    let payload = ProjectForm::from_form(&mut form)?;
    validate_project_form(&payload)?;

    let existing = find_project(&state.db, id).await?;
    check_relations(&state.db, &payload).await?;

    let mut batch = UploadBatch::new(&*state.uploads);
    let new_thumbnail = match &payload.thumbnail {
        Some(file) => Some(
            batch
                .stage(file, UploadCategory::Projects, "thumbnail")
                .await?,
        ),
        None => None,
    };

    let mut old_refs = Vec::new();
    if new_thumbnail.is_some()
        && let Some(ref old) = existing.thumbnail
        && let Some(reference) = stored_ref(old)
    {
        old_refs.push(reference);
    }

    let mut active: project::ActiveModel = existing.into();
    active.title = Set(payload.title.trim().to_string());
    if let Some(ref slug) = payload.slug {
        active.slug = Set(slug.clone());
    }
    active.client_id = Set(payload.client_id);
    active.service_id = Set(payload.service_id);
    active.description = Set(payload.description.clone());
    active.project_date = Set(payload.project_date);
    active.status = Set(payload.status.clone());
    if let Some(ref reference) = new_thumbnail {
        active.thumbnail = Set(Some(reference.as_url()));
    }
    active.updated_at = Set(chrono::Utc::now());

    let (model, committed) = batch
        .commit_with(async { active.update(&state.db).await.map_err(write_error) })
        .await?;
    committed.release(old_refs).await;

    Ok(Json(ProjectResponse::from(model)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Projects",
    operation_id = "deleteProject",
    summary = "Delete a portfolio project",
    description = "Deletes the project and its stored thumbnail.",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("project:delete")?;

    let existing = find_project(&state.db, id).await?;

    if let Some(reference) = existing.thumbnail.as_deref().and_then(stored_ref) {
        discard_all(&*state.uploads, vec![reference]).await;
    }

    project::Entity::delete_by_id(id).exec(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Referenced client and service must exist before any upload happens.
async fn check_relations<C: ConnectionTrait>(db: &C, form: &ProjectForm) -> Result<(), AppError> {
    if let Some(client_id) = form.client_id {
        client::Entity::find_by_id(client_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found".into()))?;
    }
    if let Some(service_id) = form.service_id {
        service::Entity::find_by_id(service_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".into()))?;
    }
    Ok(())
}

async fn find_project<C: ConnectionTrait>(db: &C, id: i32) -> Result<project::Model, AppError> {
    project::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
}
