//! HTTP 端点

pub mod admin;
pub mod assets;
pub mod auth;
pub mod helpers;
pub mod home;
pub mod redirect;

pub use admin::admin_routes;
pub use auth::{LoginKeyExtractor, auth_routes, login_rate_limiter};
