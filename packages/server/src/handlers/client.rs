use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::UploadCategory;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{client, project};
use crate::error::{AppError, ErrorBody, write_error};
use crate::extractors::auth::AuthUser;
use crate::extractors::form::ParsedForm;
use crate::models::client::{ClientForm, ClientResponse, validate_client_form};
use crate::mutation::uploads::{UploadBatch, discard_all, stored_ref};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Clients",
    operation_id = "listClients",
    summary = "List clients for the public directory",
    responses(
        (status = 200, description = "Clients, featured first", body = Vec<ClientResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_clients(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClientResponse>>, AppError> {
    let rows = client::Entity::find()
        .order_by_desc(client::Column::IsFeatured)
        .order_by_asc(client::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(ClientResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Clients",
    operation_id = "getClient",
    summary = "Get a client by ID",
    params(("id" = i32, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client", body = ClientResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Client not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_client(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ClientResponse>, AppError> {
    auth_user.require_any_permission(&["client:create", "client:edit"])?;

    let model = find_client(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Clients",
    operation_id = "createClient",
    summary = "Create a client",
    description = "Creates a client from a multipart form. The optional `logo` file is \
        stored first and discarded again if the database write fails.",
    request_body(content_type = "multipart/form-data", description = "Client fields plus optional logo"),
    responses(
        (status = 201, description = "Client created", body = ClientResponse),
        (status = 400, description = "Validation or upload error", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn create_client(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("client:create")?;

    let mut form = ParsedForm::read(&mut multipart).await?;
    let payload = ClientForm::from_form(&mut form)?;
    validate_client_form(&payload)?;

    let mut batch = UploadBatch::new(&*state.uploads);
    let logo = match &payload.logo {
        Some(file) => Some(batch.stage(file, UploadCategory::Clients, "logo").await?),
        None => None,
    };

    let now = chrono::Utc::now();
    let new_client = client::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        logo: Set(logo.as_ref().map(|r| r.as_url())),
        industry: Set(payload.industry.clone()),
        testimonial: Set(payload.testimonial.clone()),
        is_featured: Set(payload.is_featured),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let (model, _committed) = batch
        .commit_with(async { new_client.insert(&state.db).await.map_err(write_error) })
        .await?;

    Ok((StatusCode::CREATED, Json(ClientResponse::from(model))))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Clients",
    operation_id = "updateClient",
    summary = "Update a client",
    description = "Replaces the client's fields. A newly uploaded `logo` supersedes the \
        old one, which is deleted only after the database write commits.",
    params(("id" = i32, Path, description = "Client ID")),
    request_body(content_type = "multipart/form-data", description = "Client fields plus optional logo"),
    responses(
        (status = 200, description = "Client updated", body = ClientResponse),
        (status = 400, description = "Validation or upload error", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Client not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(id))]
pub async fn update_client(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<ClientResponse>, AppError> {
    auth_user.require_permission("client:edit")?;

    let mut form = ParsedForm::read(&mut multipart).await?;
    let payload = ClientForm::from_form(&mut form)?;
    validate_client_form(&payload)?;

    let existing = find_client(&state.db, id).await?;

    let mut batch = UploadBatch::new(&*state.uploads);
    let new_logo = match &payload.logo {
        Some(file) => Some(batch.stage(file, UploadCategory::Clients, "logo").await?),
        None => None,
    };

    let mut old_refs = Vec::new();
    if new_logo.is_some()
        && let Some(ref old) = existing.logo
        && let Some(reference) = stored_ref(old)
    {
        old_refs.push(reference);
    }

    let mut active: client::ActiveModel = existing.into();
    active.name = Set(payload.name.trim().to_string());
    if let Some(ref reference) = new_logo {
        active.logo = Set(Some(reference.as_url()));
    }
    active.industry = Set(payload.industry.clone());
    active.testimonial = Set(payload.testimonial.clone());
    active.is_featured = Set(payload.is_featured);
    active.updated_at = Set(chrono::Utc::now());

    let (model, committed) = batch
        .commit_with(async { active.update(&state.db).await.map_err(write_error) })
        .await?;
    committed.release(old_refs).await;

    Ok(Json(ClientResponse::from(model)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Clients",
    operation_id = "deleteClient",
    summary = "Delete a client",
    description = "Deletes the client and its stored logo. Projects referencing the \
        client keep their rows and lose the reference.",
    params(("id" = i32, Path, description = "Client ID")),
    responses(
        (status = 204, description = "Client deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Client not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_client(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("client:delete")?;

    let existing = find_client(&state.db, id).await?;

    if let Some(reference) = existing.logo.as_deref().and_then(stored_ref) {
        discard_all(&*state.uploads, vec![reference]).await;
    }

    let txn = state.db.begin().await?;
    project::Entity::update_many()
        .col_expr(project::Column::ClientId, Expr::value(Option::<i32>::None))
        .filter(project::Column::ClientId.eq(id))
        .exec(&txn)
        .await?;
    client::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_client<C: ConnectionTrait>(db: &C, id: i32) -> Result<client::Model, AppError> {
    client::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".into()))
}
