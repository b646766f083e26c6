pub mod auth;
pub mod request_id;

pub use auth::AdminGuard;
pub use request_id::{RequestId, RequestIdMiddleware};
