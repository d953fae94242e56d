pub mod auth;
pub mod client;
pub mod dashboard;
pub mod inquiry;
pub mod post;
pub mod price;
pub mod product;
pub mod project;
pub mod service;
pub mod settings;
pub mod shared;
pub mod user;
