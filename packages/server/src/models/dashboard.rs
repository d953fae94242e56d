use serde::Serialize;

/// Entity counts shown on the admin landing page.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    pub services: u64,
    pub products: u64,
    pub projects: u64,
    pub clients: u64,
    pub posts: u64,
    pub users: u64,
    pub inquiries: u64,
    /// Inquiries still in the `New` state.
    pub new_inquiries: u64,
}
