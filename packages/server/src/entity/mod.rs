pub mod client;
pub mod inquiry;
pub mod post;
pub mod price_option;
pub mod product;
pub mod project;
pub mod role;
pub mod role_permission;
pub mod service;
pub mod setting;
pub mod user;
