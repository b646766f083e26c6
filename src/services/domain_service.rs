//! Custom domain management service (superadmin only)

use std::sync::Arc;

use tracing::info;

use super::CurrentUser;
use crate::errors::{AppError, Result};
use crate::storage::{Domain, SeaOrmStorage};
use crate::utils::url_validator::normalize_domain_name;

pub struct DomainService {
    storage: Arc<SeaOrmStorage>,
}

impl DomainService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn list(&self) -> Result<Vec<Domain>> {
        self.storage.list_domains().await
    }

    pub async fn add(&self, actor: &CurrentUser, domain_name: &str) -> Result<Domain> {
        if domain_name.trim().is_empty() {
            return Err(AppError::validation("Domain name cannot be empty"));
        }
        let name = normalize_domain_name(domain_name).ok_or_else(|| {
            AppError::validation(format!("'{}' is not a valid domain name", domain_name.trim()))
        })?;

        if self.storage.find_domain_by_name(&name).await?.is_some() {
            return Err(AppError::conflict("Domain already exists"));
        }

        let domain = self.storage.insert_domain(&name, Some(actor.id)).await?;
        info!("Superadmin '{}' added domain '{}'", actor.username, name);
        Ok(domain)
    }

    /// 仍有短链接使用该域名时拒绝删除
    pub async fn delete(&self, actor: &CurrentUser, id: i32) -> Result<()> {
        let domain = self
            .storage
            .get_domain(id)
            .await?
            .ok_or_else(|| AppError::not_found("Domain not found"))?;

        let in_use = self.storage.count_short_urls_by_domain(id).await?;
        if in_use > 0 {
            return Err(AppError::conflict(format!(
                "Domain '{}' is still used by {} short URL(s)",
                domain.domain_name, in_use
            )));
        }

        self.storage.delete_domain(id).await?;
        info!(
            "Superadmin '{}' deleted domain '{}'",
            actor.username, domain.domain_name
        );
        Ok(())
    }
}
