//! Short URL management service
//!
//! Validate-then-write logic behind the dashboard: quota enforcement,
//! domain permissions, short-code generation and uniqueness checks.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::CurrentUser;
use crate::config::{SiteSettings, SiteSettingsStore};
use crate::errors::{AppError, Result};
use crate::storage::{BASE_DOMAIN_ID, SeaOrmStorage, ShortUrl, ShortUrlDraft};
use crate::utils::url_validator::{validate_url, validation_error_message};
use crate::utils::{
    DEFAULT_SHORT_CODE_LENGTH, TimeParser, generate_random_code, is_reserved_short_code,
    is_valid_short_code,
};

/// 随机短码碰撞时的最大重试次数
const MAX_GENERATE_ATTEMPTS: usize = 10;

// ============ Request/Response DTOs ============

/// Form submitted when adding or editing a short URL
#[derive(Debug, Clone, Default)]
pub struct UrlInput {
    pub original_url: String,
    /// Empty = generate on add, keep current on edit
    pub short_code: Option<String>,
    /// Empty = no passcode
    pub passcode: Option<String>,
    /// RFC3339, datetime-local, date or relative ("1d", "2h30m")
    pub expiry_date: Option<String>,
    pub domain_id: i32,
    pub auto_delete: bool,
}

/// A domain the current user may create links on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainOption {
    pub id: i32,
    pub name: String,
}

/// One dashboard row
#[derive(Debug, Clone)]
pub struct UrlRow {
    pub url: ShortUrl,
    pub owner: String,
    pub domain_name: String,
    pub short_link: String,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub urls: Vec<UrlRow>,
    pub domains: Vec<DomainOption>,
    pub quota: i32,
    pub url_count: u64,
    pub is_superadmin: bool,
}

// ============ UrlService Implementation ============

pub struct UrlService {
    storage: Arc<SeaOrmStorage>,
    settings: Arc<SiteSettingsStore>,
}

impl UrlService {
    pub fn new(storage: Arc<SeaOrmStorage>, settings: Arc<SiteSettingsStore>) -> Self {
        Self { storage, settings }
    }

    /// 基础域名总是可用；超级管理员可用所有域名，普通用户只能用分配给自己的域名
    pub async fn allowed_domains(&self, user: &CurrentUser) -> Result<Vec<DomainOption>> {
        let settings = self.settings.get();
        let mut options = vec![DomainOption {
            id: BASE_DOMAIN_ID,
            name: settings.base_host(),
        }];

        let domains = if user.is_superadmin() {
            self.storage.list_domains().await?
        } else {
            let ids = self.storage.domain_ids_for_user(user.id).await?;
            self.storage.domains_by_ids(&ids).await?
        };

        options.extend(domains.into_iter().map(|d| DomainOption {
            id: d.id,
            name: d.domain_name,
        }));
        Ok(options)
    }

    pub async fn dashboard(&self, user: &CurrentUser) -> Result<Dashboard> {
        let account = self
            .storage
            .get_admin(user.id)
            .await?
            .ok_or_else(|| AppError::not_found("Your account no longer exists"))?;

        let owner_filter = (!user.is_superadmin()).then_some(user.id);
        let urls = self.storage.list_short_urls(owner_filter).await?;
        let url_count = self.storage.count_short_urls_by_user(user.id).await?;

        let domains = self.allowed_domains(user).await?;
        let settings = self.settings.get();
        let domain_names = self.domain_names(&settings).await?;
        let owners: HashMap<i32, String> = if user.is_superadmin() {
            self.storage.admin_names().await?
        } else {
            HashMap::from([(user.id, account.username.clone())])
        };

        let rows = urls
            .into_iter()
            .map(|url| {
                let domain_name = domain_names
                    .get(&url.domain_id)
                    .cloned()
                    .unwrap_or_else(|| settings.base_host());
                let owner = owners
                    .get(&url.user_id)
                    .cloned()
                    .unwrap_or_else(|| format!("#{}", url.user_id));
                let short_link = settings.short_link(&domain_name, &url.short_code);
                UrlRow {
                    url,
                    owner,
                    domain_name,
                    short_link,
                }
            })
            .collect();

        Ok(Dashboard {
            urls: rows,
            domains,
            quota: account.quota,
            url_count,
            is_superadmin: user.is_superadmin(),
        })
    }

    async fn domain_names(&self, settings: &SiteSettings) -> Result<HashMap<i32, String>> {
        let mut names: HashMap<i32, String> = self
            .storage
            .list_domains()
            .await?
            .into_iter()
            .map(|d| (d.id, d.domain_name))
            .collect();
        names.insert(BASE_DOMAIN_ID, settings.base_host());
        Ok(names)
    }

    /// Create a short URL owned by `user`
    pub async fn create(&self, user: &CurrentUser, input: UrlInput) -> Result<ShortUrl> {
        let account = self
            .storage
            .get_admin(user.id)
            .await?
            .ok_or_else(|| AppError::forbidden("Your account no longer exists"))?;

        // 配额：超级管理员不受限，quota = 0 表示不限
        if !account.is_superadmin() && account.quota > 0 {
            let count = self.storage.count_short_urls_by_user(account.id).await?;
            if count >= account.quota as u64 {
                return Err(AppError::quota_exceeded(
                    "Your short URL quota has been reached",
                ));
            }
        }

        let original_url = Self::validate_target(&input.original_url)?;
        self.ensure_domain_allowed(user, input.domain_id).await?;

        let short_code = match non_empty(input.short_code.as_deref()) {
            Some(code) => {
                Self::validate_code(code)?;
                if self
                    .storage
                    .short_code_taken(code, input.domain_id, None)
                    .await?
                {
                    return Err(AppError::conflict(
                        "This short code already exists on that domain, please choose another",
                    ));
                }
                code.to_string()
            }
            None => self.generate_unique_code(input.domain_id).await?,
        };

        let expiry_date = TimeParser::parse_optional(input.expiry_date.as_deref())
            .map_err(|e| AppError::date_parse(format!("Invalid expiry date: {}", e)))?;

        let draft = ShortUrlDraft {
            original_url,
            short_code,
            passcode: non_empty(input.passcode.as_deref()).map(str::to_string),
            expiry_date,
            domain_id: input.domain_id,
            auto_delete: input.auto_delete,
        };

        let created = self.storage.insert_short_url(account.id, draft).await?;
        info!(
            "User '{}' created short URL '{}' (domain {})",
            user.username, created.short_code, created.domain_id
        );
        Ok(created)
    }

    /// Edit a short URL; only its owner or a superadmin may do so
    pub async fn edit(&self, user: &CurrentUser, id: i32, input: UrlInput) -> Result<ShortUrl> {
        let existing = self.owned_url(user, id, "edit").await?;

        let original_url = Self::validate_target(&input.original_url)?;
        if input.domain_id != existing.domain_id {
            self.ensure_domain_allowed(user, input.domain_id).await?;
        }

        let short_code = match non_empty(input.short_code.as_deref()) {
            Some(code) => {
                Self::validate_code(code)?;
                code.to_string()
            }
            None => existing.short_code.clone(),
        };

        if self
            .storage
            .short_code_taken(&short_code, input.domain_id, Some(id))
            .await?
        {
            return Err(AppError::conflict(
                "This short code already exists on that domain, please choose another",
            ));
        }

        let expiry_date = TimeParser::parse_optional(input.expiry_date.as_deref())
            .map_err(|e| AppError::date_parse(format!("Invalid expiry date: {}", e)))?;

        let draft = ShortUrlDraft {
            original_url,
            short_code,
            passcode: non_empty(input.passcode.as_deref()).map(str::to_string),
            expiry_date,
            domain_id: input.domain_id,
            auto_delete: input.auto_delete,
        };

        let updated = self.storage.update_short_url(id, draft).await?;
        info!("User '{}' updated short URL {}", user.username, id);
        Ok(updated)
    }

    pub async fn delete(&self, user: &CurrentUser, id: i32) -> Result<()> {
        let existing = self.owned_url(user, id, "delete").await?;
        if !self.storage.delete_short_url(existing.id).await? {
            return Err(AppError::not_found("Short URL not found"));
        }
        info!(
            "User '{}' deleted short URL '{}'",
            user.username, existing.short_code
        );
        Ok(())
    }

    async fn owned_url(&self, user: &CurrentUser, id: i32, action: &str) -> Result<ShortUrl> {
        match self.storage.get_short_url(id).await? {
            Some(url) if user.is_superadmin() || url.user_id == user.id => Ok(url),
            _ => {
                warn!(
                    "User '{}' denied {} on short URL {}",
                    user.username, action, id
                );
                Err(AppError::forbidden(format!(
                    "You do not have permission to {} this URL",
                    action
                )))
            }
        }
    }

    async fn ensure_domain_allowed(&self, user: &CurrentUser, domain_id: i32) -> Result<()> {
        if domain_id == BASE_DOMAIN_ID {
            return Ok(());
        }
        let allowed = if user.is_superadmin() {
            self.storage.get_domain(domain_id).await?.is_some()
        } else {
            self.storage
                .domain_ids_for_user(user.id)
                .await?
                .contains(&domain_id)
        };
        if allowed {
            Ok(())
        } else {
            Err(AppError::forbidden("You cannot use this domain"))
        }
    }

    async fn generate_unique_code(&self, domain_id: i32) -> Result<String> {
        for _ in 0..MAX_GENERATE_ATTEMPTS {
            let code = generate_random_code(DEFAULT_SHORT_CODE_LENGTH);
            if is_reserved_short_code(&code) {
                continue;
            }
            if !self.storage.short_code_taken(&code, domain_id, None).await? {
                return Ok(code);
            }
        }
        Err(AppError::conflict(
            "Could not generate a unique short code, please try again",
        ))
    }

    fn validate_target(url: &str) -> Result<String> {
        let url = url.trim();
        validate_url(url).map_err(|e| AppError::validation(validation_error_message(&e)))?;
        Ok(url.to_string())
    }

    fn validate_code(code: &str) -> Result<()> {
        if !is_valid_short_code(code) {
            return Err(AppError::validation(format!(
                "Invalid short code '{}'. Only letters, digits, '-' and '_' are allowed",
                code
            )));
        }
        if is_reserved_short_code(code) {
            return Err(AppError::validation(format!(
                "Short code '{}' is reserved",
                code
            )));
        }
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
