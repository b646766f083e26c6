//! Authentication service
//!
//! Login with first-run superadmin bootstrap, profile updates and the
//! password reset used by the CLI.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::{AppError, Result};
use crate::storage::{Admin, AdminUpdate, SeaOrmStorage};
use crate::utils::password::{hash_password, verify_password};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub admin: Admin,
    /// 本次登录创建了超级管理员
    pub bootstrapped: bool,
}

/// Form submitted from the profile dialog
#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    pub username: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
    pub current_password: String,
}

pub struct AuthService {
    storage: Arc<SeaOrmStorage>,
}

impl AuthService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn has_admin(&self) -> Result<bool> {
        self.storage.has_admin().await
    }

    /// 校验用户名密码；没有任何账号时用提交的凭据创建超级管理员
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::auth_failed(INVALID_CREDENTIALS));
        }

        if !self.storage.has_admin().await? {
            let hash = hash_password(password)?;
            if let Some(admin) = self.storage.bootstrap_superadmin(username, &hash).await? {
                return Ok(LoginOutcome {
                    admin,
                    bootstrapped: true,
                });
            }
            // 并发的首次登录已抢先创建账号，按普通登录处理
        }

        let admin = match self.storage.find_admin_by_username(username).await? {
            Some(admin) => admin,
            None => {
                warn!("Login failed: unknown user '{}'", username);
                return Err(AppError::auth_failed(INVALID_CREDENTIALS));
            }
        };

        if !verify_password(password, &admin.password)? {
            warn!("Login failed: wrong password for '{}'", username);
            return Err(AppError::auth_failed(INVALID_CREDENTIALS));
        }

        if !admin.is_active() {
            warn!("Login refused: account '{}' is disabled", username);
            return Err(AppError::account_disabled("Your account has been disabled"));
        }

        info!("User '{}' logged in", admin.username);
        Ok(LoginOutcome {
            admin,
            bootstrapped: false,
        })
    }

    /// 校验当前密码后更新用户名/密码，配额和角色保持不变
    pub async fn update_profile(&self, user_id: i32, input: ProfileInput) -> Result<Admin> {
        let admin = self
            .storage
            .get_admin(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Your account could not be found"))?;

        if !verify_password(&input.current_password, &admin.password)? {
            return Err(AppError::auth_failed("Current password is incorrect"));
        }

        let new_password = input.new_password.as_deref().filter(|p| !p.is_empty());
        if let Some(new_password) = new_password
            && Some(new_password) != input.confirm_password.as_deref()
        {
            return Err(AppError::validation(
                "New password and confirmation do not match",
            ));
        }

        let username = match input.username.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => admin.username.clone(),
        };
        if username != admin.username && self.storage.username_taken(&username, Some(user_id)).await?
        {
            return Err(AppError::conflict("Username already exists"));
        }

        let password_hash = new_password.map(hash_password).transpose()?;

        let updated = self
            .storage
            .update_admin(
                user_id,
                AdminUpdate {
                    username,
                    password_hash,
                    quota: admin.quota,
                    role: admin.role,
                },
            )
            .await?;

        info!("User '{}' updated their profile", updated.username);
        Ok(updated)
    }

    /// CLI: 重置指定账号的密码
    pub async fn reset_password(&self, username: &str, new_password: &str) -> Result<Admin> {
        if new_password.is_empty() {
            return Err(AppError::validation("Password cannot be empty"));
        }
        let admin = self
            .storage
            .find_admin_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{}' not found", username)))?;

        self.storage
            .set_admin_password(admin.id, hash_password(new_password)?)
            .await?;
        info!("Password reset for '{}'", username);
        Ok(admin)
    }
}
