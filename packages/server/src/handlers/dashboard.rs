use axum::Json;
use axum::extract::State;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{client, inquiry, post, product, project, service, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::dashboard::DashboardResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Dashboard",
    operation_id = "getDashboard",
    summary = "Entity counts for the admin landing page",
    responses(
        (status = 200, description = "Counts", body = DashboardResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_dashboard(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    auth_user.require_permission("dashboard:view")?;

    let services = service::Entity::find().count(&state.db).await?;
    let products = product::Entity::find().count(&state.db).await?;
    let projects = project::Entity::find().count(&state.db).await?;
    let clients = client::Entity::find().count(&state.db).await?;
    let posts = post::Entity::find().count(&state.db).await?;
    let users = user::Entity::find().count(&state.db).await?;
    let inquiries = inquiry::Entity::find().count(&state.db).await?;
    let new_inquiries = inquiry::Entity::find()
        .filter(inquiry::Column::Status.eq("New"))
        .count(&state.db)
        .await?;

    Ok(Json(DashboardResponse {
        services,
        products,
        projects,
        clients,
        posts,
        users,
        inquiries,
        new_inquiries,
    }))
}
