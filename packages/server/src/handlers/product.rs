use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::UploadCategory;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{price_option, product, service};
use crate::error::{AppError, ErrorBody, write_error};
use crate::extractors::auth::AuthUser;
use crate::extractors::form::ParsedForm;
use crate::extractors::json::AppJson;
use crate::models::price::{PriceOptionRequest, PriceOptionResponse, validate_price_option};
use crate::models::product::{
    ProductDetailResponse, ProductForm, ProductResponse, validate_product_form,
};
use crate::models::shared::features_to_json;
use crate::mutation::slug::unique_slug;
use crate::mutation::uploads::{UploadBatch, discard_all, stored_ref};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Products",
    operation_id = "listProducts",
    summary = "List active products",
    responses(
        (status = 200, description = "Active products", body = Vec<ProductResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let rows = product::Entity::find()
        .filter(product::Column::IsActive.eq(true))
        .order_by_asc(product::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(ProductResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/by-slug/{slug}",
    tag = "Products",
    operation_id = "getProductBySlug",
    summary = "Get an active product by slug, with its pricing tiers",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product with pricing", body = ProductDetailResponse),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(slug))]
pub async fn get_product_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetailResponse>, AppError> {
    let model = product::Entity::find()
        .filter(product::Column::Slug.eq(&slug))
        .filter(product::Column::IsActive.eq(true))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    let prices = price_option::Entity::find()
        .filter(price_option::Column::ProductId.eq(model.id))
        .order_by_asc(price_option::Column::DisplayOrder)
        .all(&state.db)
        .await?;

    Ok(Json(ProductDetailResponse {
        product: ProductResponse::from(model),
        price_options: prices.into_iter().map(PriceOptionResponse::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/all",
    tag = "Products",
    operation_id = "listAllProducts",
    summary = "List every product, inactive included",
    responses(
        (status = 200, description = "All products", body = Vec<ProductResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_all_products(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    auth_user.require_any_permission(&["product:create", "product:edit"])?;

    let rows = product::Entity::find()
        .order_by_desc(product::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(ProductResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    operation_id = "getProduct",
    summary = "Get a product by ID",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = ProductResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_product(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductResponse>, AppError> {
    auth_user.require_any_permission(&["product:create", "product:edit"])?;

    let model = find_product(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Products",
    operation_id = "createProduct",
    summary = "Create a product",
    description = "Creates a product from a multipart form. Optional `thumbnail` and \
        `detail_image` files are stored first and discarded again if the database write \
        fails. An omitted slug is derived from the name.",
    request_body(content_type = "multipart/form-data", description = "Product fields plus optional images"),
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Validation or upload error", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Service not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Slug already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn create_product(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("product:create")?;

    let mut form = ParsedForm::read(&mut multipart).await?;
    let payload = ProductForm::from_form(&mut form)?;
    validate_product_form(&payload)?;

    find_service(&state.db, payload.service_id).await?;

    let slug = unique_slug::<product::Entity, _>(
        &state.db,
        product::Column::Slug,
        payload.slug.clone(),
        &payload.name,
    )
    .await?;

    let mut batch = UploadBatch::new(&*state.uploads);
    let thumbnail = match &payload.thumbnail {
        Some(file) => Some(
            batch
                .stage(file, UploadCategory::Products, "thumbnail")
                .await?,
        ),
        None => None,
    };
    let detail_image = match &payload.detail_image {
        Some(file) => Some(
            batch
                .stage(file, UploadCategory::Products, "detail image")
                .await?,
        ),
        None => None,
    };

    let now = chrono::Utc::now();
    let new_product = product::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        slug: Set(slug),
        service_id: Set(payload.service_id),
        description: Set(payload.description.clone()),
        features: Set(payload.features.clone()),
        thumbnail: Set(thumbnail.as_ref().map(|r| r.as_url())),
        detail_image: Set(detail_image.as_ref().map(|r| r.as_url())),
        is_active: Set(payload.is_active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let (model, _committed) = batch
        .commit_with(async { new_product.insert(&state.db).await.map_err(write_error) })
        .await?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(model))))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    operation_id = "updateProduct",
    summary = "Update a product",
    description = "Replaces the product's fields. Newly uploaded images supersede the old \
        ones, which are deleted only after the database write commits; omitted image \
        fields leave the stored files untouched.",
    params(("id" = i32, Path, description = "Product ID")),
    request_body(content_type = "multipart/form-data", description = "Product fields plus optional images"),
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Validation or upload error", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Slug already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(id))]
pub async fn update_product(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<ProductResponse>, AppError> {
    auth_user.require_permission("product:edit")?;

    let mut form = ParsedForm::read(&mut multipart).await?;
    let payload = ProductForm::from_form(&mut form)?;
    validate_product_form(&payload)?;

    let existing = find_product(&state.db, id).await?;
    find_service(&state.db, payload.service_id).await?;

    let mut batch = UploadBatch::new(&*state.uploads);
    let new_thumbnail = match &payload.thumbnail {
        Some(file) => Some(
            batch
                .stage(file, UploadCategory::Products, "thumbnail")
                .await?,
        ),
        None => None,
    };
    let new_detail = match &payload.detail_image {
        Some(file) => Some(
            batch
                .stage(file, UploadCategory::Products, "detail image")
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
    if new_detail.is_some()
        && let Some(ref old) = existing.detail_image
        && let Some(reference) = stored_ref(old)
    {
        old_refs.push(reference);
    }

    let mut active: product::ActiveModel = existing.into();
    active.name = Set(payload.name.trim().to_string());
    if let Some(ref slug) = payload.slug {
        active.slug = Set(slug.clone());
    }
    active.service_id = Set(payload.service_id);
    active.description = Set(payload.description.clone());
    active.features = Set(payload.features.clone());
    if let Some(ref reference) = new_thumbnail {
        active.thumbnail = Set(Some(reference.as_url()));
    }
    if let Some(ref reference) = new_detail {
        active.detail_image = Set(Some(reference.as_url()));
    }
    active.is_active = Set(payload.is_active);
    active.updated_at = Set(chrono::Utc::now());

    let (model, committed) = batch
        .commit_with(async { active.update(&state.db).await.map_err(write_error) })
        .await?;
    committed.release(old_refs).await;

    Ok(Json(ProductResponse::from(model)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    operation_id = "deleteProduct",
    summary = "Delete a product",
    description = "Deletes the product, its pricing tiers, and its stored images.",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_product(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("product:delete")?;

    let existing = find_product(&state.db, id).await?;

    let refs: Vec<_> = [existing.thumbnail.as_deref(), existing.detail_image.as_deref()]
        .into_iter()
        .flatten()
        .filter_map(stored_ref)
        .collect();
    discard_all(&*state.uploads, refs).await;

    let txn = state.db.begin().await?;
    price_option::Entity::delete_many()
        .filter(price_option::Column::ProductId.eq(id))
        .exec(&txn)
        .await?;
    product::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Price Options",
    operation_id = "listPriceOptions",
    summary = "List a product's pricing tiers",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Pricing tiers", body = Vec<PriceOptionResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(product_id))]
pub async fn list_price_options(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<Vec<PriceOptionResponse>>, AppError> {
    auth_user.require_permission("price:manage")?;

    find_product(&state.db, product_id).await?;

    let rows = price_option::Entity::find()
        .filter(price_option::Column::ProductId.eq(product_id))
        .order_by_asc(price_option::Column::DisplayOrder)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(PriceOptionResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Price Options",
    operation_id = "createPriceOption",
    summary = "Add a pricing tier to a product",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = PriceOptionRequest,
    responses(
        (status = 201, description = "Pricing tier created", body = PriceOptionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(product_id))]
pub async fn create_price_option(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
    AppJson(payload): AppJson<PriceOptionRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("price:manage")?;
    validate_price_option(&payload)?;

    find_product(&state.db, product_id).await?;

    let new_price = price_option::ActiveModel {
        product_id: Set(product_id),
        name: Set(payload.name.trim().to_string()),
        price: Set(payload.price),
        features: Set(features_to_json(payload.features)?),
        whatsapp_url: Set(payload.whatsapp_url),
        is_best_value: Set(payload.is_best_value),
        display_order: Set(payload.display_order),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_price.insert(&state.db).await.map_err(write_error)?;

    Ok((StatusCode::CREATED, Json(PriceOptionResponse::from(model))))
}

#[utoipa::path(
    put,
    path = "/{price_id}",
    tag = "Price Options",
    operation_id = "updatePriceOption",
    summary = "Update a pricing tier",
    params(
        ("id" = i32, Path, description = "Product ID"),
        ("price_id" = i32, Path, description = "Pricing tier ID"),
    ),
    request_body = PriceOptionRequest,
    responses(
        (status = 200, description = "Pricing tier updated", body = PriceOptionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Pricing tier not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(product_id, price_id))]
pub async fn update_price_option(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((product_id, price_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<PriceOptionRequest>,
) -> Result<Json<PriceOptionResponse>, AppError> {
    auth_user.require_permission("price:manage")?;
    validate_price_option(&payload)?;

    let existing = find_price_option(&state.db, product_id, price_id).await?;

    let mut active: price_option::ActiveModel = existing.into();
    active.name = Set(payload.name.trim().to_string());
    active.price = Set(payload.price);
    active.features = Set(features_to_json(payload.features)?);
    active.whatsapp_url = Set(payload.whatsapp_url);
    active.is_best_value = Set(payload.is_best_value);
    active.display_order = Set(payload.display_order);

    let model = active.update(&state.db).await.map_err(write_error)?;

    Ok(Json(PriceOptionResponse::from(model)))
}

#[utoipa::path(
    delete,
    path = "/{price_id}",
    tag = "Price Options",
    operation_id = "deletePriceOption",
    summary = "Delete a pricing tier",
    params(
        ("id" = i32, Path, description = "Product ID"),
        ("price_id" = i32, Path, description = "Pricing tier ID"),
    ),
    responses(
        (status = 204, description = "Pricing tier deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Pricing tier not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(product_id, price_id))]
pub async fn delete_price_option(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((product_id, price_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("price:manage")?;

    let existing = find_price_option(&state.db, product_id, price_id).await?;

    price_option::Entity::delete_by_id(existing.id)
        .exec(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_product<C: ConnectionTrait>(db: &C, id: i32) -> Result<product::Model, AppError> {
    product::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))
}

async fn find_service<C: ConnectionTrait>(db: &C, id: i32) -> Result<service::Model, AppError> {
    service::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".into()))
}

async fn find_price_option<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    price_id: i32,
) -> Result<price_option::Model, AppError> {
    let price = price_option::Entity::find_by_id(price_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Pricing tier not found".into()))?;

    if price.product_id != product_id {
        return Err(AppError::NotFound("Pricing tier not found".into()));
    }

    Ok(price)
}
