use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::UploadCategory;
use sea_orm::*;
use tracing::instrument;

use crate::entity::post;
use crate::error::{AppError, ErrorBody, write_error};
use crate::extractors::auth::AuthUser;
use crate::extractors::form::ParsedForm;
use crate::models::post::{PostForm, PostListItem, PostResponse, validate_post_form};
use crate::mutation::slug::unique_slug;
use crate::mutation::uploads::{UploadBatch, discard_all, stored_ref};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Blog",
    operation_id = "listPosts",
    summary = "List published posts",
    responses(
        (status = 200, description = "Published posts, newest first", body = Vec<PostListItem>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PostListItem>>, AppError> {
    let rows = post::Entity::find()
        .filter(post::Column::Status.eq("published"))
        .order_by_desc(post::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(PostListItem::from).collect()))
}

#[utoipa::path(
    get,
    path = "/by-slug/{slug}",
    tag = "Blog",
    operation_id = "getPostBySlug",
    summary = "Get a published post by slug",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Post", body = PostResponse),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(slug))]
pub async fn get_post_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostResponse>, AppError> {
    let model = post::Entity::find()
        .filter(post::Column::Slug.eq(&slug))
        .filter(post::Column::Status.eq("published"))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/all",
    tag = "Blog",
    operation_id = "listAllPosts",
    summary = "List every post, drafts included",
    responses(
        (status = 200, description = "All posts", body = Vec<PostListItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_all_posts(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<PostListItem>>, AppError> {
    auth_user.require_any_permission(&["post:create", "post:edit"])?;

    let rows = post::Entity::find()
        .order_by_desc(post::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(PostListItem::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Blog",
    operation_id = "getPost",
    summary = "Get a post by ID",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post", body = PostResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PostResponse>, AppError> {
    auth_user.require_any_permission(&["post:create", "post:edit"])?;

    let model = find_post(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Blog",
    operation_id = "createPost",
    summary = "Create a blog post",
    description = "Creates a post from a multipart form. The optional `cover_image` file \
        is stored first and discarded again if the database write fails.",
    request_body(content_type = "multipart/form-data", description = "Post fields plus optional cover_image"),
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Validation or upload error", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Slug already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn create_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("post:create")?;

    let mut form = ParsedForm::read(&mut multipart).await?;
    let payload = PostForm::from_form(&mut form)?;
    validate_post_form(&payload)?;

    let slug = unique_slug::<post::Entity, _>(
        &state.db,
        post::Column::Slug,
        payload.slug.clone(),
        &payload.title,
    )
    .await?;

    let mut batch = UploadBatch::new(&*state.uploads);
    let cover = match &payload.cover_image {
        Some(file) => Some(batch.stage(file, UploadCategory::Blog, "cover image").await?),
        None => None,
    };

    let now = chrono::Utc::now();
    let new_post = post::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        slug: Set(slug),
        content: Set(payload.content.clone()),
        excerpt: Set(payload.excerpt.clone()),
        meta_description: Set(payload.meta_description.clone()),
        cover_image: Set(cover.as_ref().map(|r| r.as_url())),
        status: Set(payload.status.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let (model, _committed) = batch
        .commit_with(async { new_post.insert(&state.db).await.map_err(write_error) })
        .await?;

    Ok((StatusCode::CREATED, Json(PostResponse::from(model))))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Blog",
    operation_id = "updatePost",
    summary = "Update a blog post",
    description = "Replaces the post's fields. A newly uploaded `cover_image` supersedes \
        the old one, which is deleted only after the database write commits.",
    params(("id" = i32, Path, description = "Post ID")),
    request_body(content_type = "multipart/form-data", description = "Post fields plus optional cover_image"),
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 400, description = "Validation or upload error", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Slug already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(id))]
pub async fn update_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<PostResponse>, AppError> {
    auth_user.require_permission("post:edit")?;

    let mut form = ParsedForm::read(&mut multipart).await?;
    let payload = PostForm::from_form(&mut form)?;
    validate_post_form(&payload)?;

    let existing = find_post(&state.db, id).await?;

    let mut batch = UploadBatch::new(&*state.uploads);
    let new_cover = match &payload.cover_image {
        Some(file) => Some(batch.stage(file, UploadCategory::Blog, "cover image").await?),
        None => None,
    };

    let mut old_refs = Vec::new();
    if new_cover.is_some()
        && let Some(ref old) = existing.cover_image
        && let Some(reference) = stored_ref(old)
    {
        old_refs.push(reference);
    }

    let mut active: post::ActiveModel = existing.into();
    active.title = Set(payload.title.trim().to_string());
    if let Some(ref slug) = payload.slug {
        active.slug = Set(slug.clone());
    }
    active.content = Set(payload.content.clone());
    active.excerpt = Set(payload.excerpt.clone());
    active.meta_description = Set(payload.meta_description.clone());
    if let Some(ref reference) = new_cover {
        active.cover_image = Set(Some(reference.as_url()));
    }
    active.status = Set(payload.status.clone());
    active.updated_at = Set(chrono::Utc::now());

    let (model, committed) = batch
        .commit_with(async { active.update(&state.db).await.map_err(write_error) })
        .await?;
    committed.release(old_refs).await;

    Ok(Json(PostResponse::from(model)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Blog",
    operation_id = "deletePost",
    summary = "Delete a blog post",
    description = "Deletes the post and its stored cover image.",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("post:delete")?;

    let existing = find_post(&state.db, id).await?;

    if let Some(reference) = existing.cover_image.as_deref().and_then(stored_ref) {
        discard_all(&*state.uploads, vec![reference]).await;
    }

    post::Entity::delete_by_id(id).exec(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_post<C: ConnectionTrait>(db: &C, id: i32) -> Result<post::Model, AppError> {
    post::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))
}
