use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/services", service_routes())
        .nest("/products", product_routes())
        .nest("/projects", project_routes())
        .nest("/clients", client_routes())
        .nest("/posts", post_routes())
        .nest("/inquiries", inquiry_routes())
        .nest("/settings", settings_routes())
        .nest("/dashboard", dashboard_routes())
        .nest("/users", user_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn service_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::service::list_services,
            handlers::service::create_service
        ))
        .routes(routes!(handlers::service::list_all_services))
        .routes(routes!(handlers::service::get_service_by_slug))
        .routes(routes!(
            handlers::service::get_service,
            handlers::service::update_service,
            handlers::service::delete_service
        ))
        .layer(handlers::upload_body_limit())
}

fn product_routes() -> OpenApiRouter<AppState> {
    let products = OpenApiRouter::new()
        .routes(routes!(
            handlers::product::list_products,
            handlers::product::create_product
        ))
        .routes(routes!(handlers::product::list_all_products))
        .routes(routes!(handlers::product::get_product_by_slug))
        .routes(routes!(
            handlers::product::get_product,
            handlers::product::update_product,
            handlers::product::delete_product
        ))
        .layer(handlers::upload_body_limit());

    let prices = OpenApiRouter::new()
        .routes(routes!(
            handlers::product::list_price_options,
            handlers::product::create_price_option
        ))
        .routes(routes!(
            handlers::product::update_price_option,
            handlers::product::delete_price_option
        ));

    products.nest("/{id}/prices", prices)
}

fn project_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::project::list_projects,
            handlers::project::create_project
        ))
        .routes(routes!(handlers::project::get_project_by_slug))
        .routes(routes!(
            handlers::project::get_project,
            handlers::project::update_project,
            handlers::project::delete_project
        ))
        .layer(handlers::upload_body_limit())
}

fn client_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::client::list_clients,
            handlers::client::create_client
        ))
        .routes(routes!(
            handlers::client::get_client,
            handlers::client::update_client,
            handlers::client::delete_client
        ))
        .layer(handlers::upload_body_limit())
}

fn post_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::post::list_posts,
            handlers::post::create_post
        ))
        .routes(routes!(handlers::post::list_all_posts))
        .routes(routes!(handlers::post::get_post_by_slug))
        .routes(routes!(
            handlers::post::get_post,
            handlers::post::update_post,
            handlers::post::delete_post
        ))
        .layer(handlers::upload_body_limit())
}

fn inquiry_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::inquiry::submit_inquiry,
            handlers::inquiry::list_inquiries
        ))
        .routes(routes!(handlers::inquiry::update_inquiry_status))
        .routes(routes!(handlers::inquiry::delete_inquiry))
}

fn settings_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::settings::get_site_settings,
            handlers::settings::update_settings
        ))
        .routes(routes!(handlers::settings::get_raw_settings))
}

fn dashboard_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::dashboard::get_dashboard))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::user::list_users,
            handlers::user::create_user
        ))
        .routes(routes!(handlers::user::update_user_role))
        .routes(routes!(handlers::user::delete_user))
}
