//! Service layer for business logic
//!
//! Shared between the HTTP handlers and the CLI maintenance commands.

mod auth_service;
mod domain_service;
mod redirect_service;
mod url_service;
mod user_service;

use serde::{Deserialize, Serialize};

use crate::storage::{Admin, Role};

pub use auth_service::*;
pub use domain_service::*;
pub use redirect_service::*;
pub use url_service::*;
pub use user_service::*;

/// The logged-in account as stored in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_superadmin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}

impl From<&Admin> for CurrentUser {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username.clone(),
            role: admin.role,
        }
    }
}
