//! Account management service (superadmin only)

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};

use super::CurrentUser;
use crate::errors::{AppError, Result};
use crate::storage::{AccountStatus, Admin, AdminUpdate, Domain, NewAdmin, Role, SeaOrmStorage};
use crate::utils::password::{hash_password, process_new_password};

/// Form submitted when adding or editing an account
#[derive(Debug, Clone, Default)]
pub struct UserInput {
    pub username: String,
    /// Required on add; empty on edit keeps the current password
    pub password: Option<String>,
    pub quota: Option<String>,
    pub role: Option<String>,
    pub domain_ids: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct UserRow {
    pub user: Admin,
    pub domain_ids: Vec<i32>,
    pub url_count: u64,
}

#[derive(Debug, Clone)]
pub struct UserManagement {
    pub users: Vec<UserRow>,
    pub domains: Vec<Domain>,
}

pub struct UserService {
    storage: Arc<SeaOrmStorage>,
}

impl UserService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn overview(&self) -> Result<UserManagement> {
        let users = self.storage.list_admins().await?;
        let mut assignments: HashMap<i32, Vec<i32>> = self.storage.all_domain_assignments().await?;
        let domains = self.storage.list_domains().await?;

        let mut rows = Vec::with_capacity(users.len());
        for user in users {
            let url_count = self.storage.count_short_urls_by_user(user.id).await?;
            let domain_ids = assignments.remove(&user.id).unwrap_or_default();
            rows.push(UserRow {
                user,
                domain_ids,
                url_count,
            });
        }

        Ok(UserManagement {
            users: rows,
            domains,
        })
    }

    pub async fn add(&self, actor: &CurrentUser, input: UserInput) -> Result<Admin> {
        let username = input.username.trim().to_string();
        let password = input.password.as_deref().unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::validation("Please fill in all required fields"));
        }

        let quota = parse_quota(input.quota.as_deref())?;
        let role = parse_role(input.role.as_deref())?;

        if self.storage.username_taken(&username, None).await? {
            return Err(AppError::conflict("Username already exists"));
        }

        let created = self
            .storage
            .create_admin_with_domains(
                NewAdmin {
                    username,
                    password_hash: hash_password(password)?,
                    quota,
                    role,
                },
                &input.domain_ids,
            )
            .await?;

        info!(
            "Superadmin '{}' created account '{}' ({})",
            actor.username, created.username, created.role
        );
        Ok(created)
    }

    pub async fn edit(&self, actor: &CurrentUser, id: i32, input: UserInput) -> Result<Admin> {
        let existing = self
            .storage
            .get_admin(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let role = match input.role.as_deref().filter(|r| !r.trim().is_empty()) {
            Some(r) => parse_role(Some(r))?,
            None => existing.role,
        };
        if id == actor.id && role != existing.role {
            return Err(AppError::forbidden("You cannot change your own role"));
        }

        let username = match input.username.trim() {
            "" => existing.username.clone(),
            name => name.to_string(),
        };
        if username != existing.username && self.storage.username_taken(&username, Some(id)).await? {
            return Err(AppError::conflict("Username already exists"));
        }

        let quota = parse_quota(input.quota.as_deref())?;
        let password_hash = process_new_password(input.password.as_deref())?;

        let updated = self
            .storage
            .update_admin_with_domains(
                id,
                AdminUpdate {
                    username,
                    password_hash,
                    quota,
                    role,
                },
                &input.domain_ids,
            )
            .await?;

        info!(
            "Superadmin '{}' updated account '{}'",
            actor.username, updated.username
        );
        Ok(updated)
    }

    /// 删除账号及其全部短链接
    pub async fn delete(&self, actor: &CurrentUser, id: i32) -> Result<()> {
        if id == actor.id {
            return Err(AppError::forbidden("You cannot delete yourself"));
        }
        if !self.storage.delete_admin_with_urls(id).await? {
            return Err(AppError::not_found("User not found"));
        }
        info!("Superadmin '{}' deleted account {}", actor.username, id);
        Ok(())
    }

    /// 返回切换后的状态
    pub async fn toggle_status(&self, actor: &CurrentUser, id: i32) -> Result<AccountStatus> {
        if id == actor.id {
            return Err(AppError::forbidden("You cannot disable your own account"));
        }
        let user = self
            .storage
            .get_admin(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let next = user.status.toggled();
        self.storage.set_admin_status(id, next).await?;
        warn!(
            "Superadmin '{}' set account '{}' to {}",
            actor.username, user.username, next
        );
        Ok(next)
    }
}

/// 空白视为 0（不限），负数或非数字报错
fn parse_quota(value: Option<&str>) -> Result<i32> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(0),
        Some(s) => s
            .parse::<i32>()
            .ok()
            .filter(|q| *q >= 0)
            .ok_or_else(|| AppError::validation("Quota must be a non-negative integer")),
    }
}

fn parse_role(value: Option<&str>) -> Result<Role> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Role::User),
        Some(s) => Role::from_str(s).map_err(|_| AppError::validation(format!("Unknown role: {}", s))),
    }
}
