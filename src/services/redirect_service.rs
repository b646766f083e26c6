//! Redirection resolver
//!
//! Host -> domain id, code lookup, expiry with lazy auto-delete, passcode
//! challenge and click counting.

use std::sync::Arc;

use subtle::ConstantTimeEq;
use tracing::{debug, info, instrument};

use crate::config::SiteSettingsStore;
use crate::errors::{AppError, Result};
use crate::storage::{BASE_DOMAIN_ID, SeaOrmStorage, ShortUrl};
use crate::utils::url_validator::strip_port;
use crate::utils::{is_reserved_short_code, is_valid_short_code};

/// Outcome of `GET /{short_code}`
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Click counted, send the visitor here
    Redirect(String),
    /// Passcode required before redirecting
    Challenge(ShortUrl),
}

/// Outcome of `POST /{short_code}`
#[derive(Debug, Clone)]
pub enum VerifyOutcome {
    Redirect(String),
    WrongCaptcha(ShortUrl),
    WrongPasscode(ShortUrl),
}

pub struct RedirectService {
    storage: Arc<SeaOrmStorage>,
    settings: Arc<SiteSettingsStore>,
}

impl RedirectService {
    pub fn new(storage: Arc<SeaOrmStorage>, settings: Arc<SiteSettingsStore>) -> Self {
        Self { storage, settings }
    }

    /// 基础域名返回 0，否则按域名表查找
    pub async fn resolve_domain(&self, host: &str) -> Result<i32> {
        let host = strip_port(host.trim()).trim_end_matches('.').to_ascii_lowercase();
        if host == self.settings.get().base_host() {
            return Ok(BASE_DOMAIN_ID);
        }
        match self.storage.find_domain_by_name(&host).await? {
            Some(domain) => Ok(domain.id),
            None => Err(AppError::not_found("Domain not found")),
        }
    }

    /// 查找并检查过期；过期且 auto_delete 时先删除再返回 410
    async fn lookup(&self, host: &str, code: &str) -> Result<ShortUrl> {
        if !is_valid_short_code(code) || is_reserved_short_code(code) {
            return Err(AppError::not_found("Short URL not found"));
        }

        let domain_id = self.resolve_domain(host).await?;
        let url = self
            .storage
            .find_short_url(code, domain_id)
            .await?
            .ok_or_else(|| AppError::not_found("Short URL not found"))?;

        if url.is_expired() {
            if url.auto_delete {
                self.storage.delete_short_url(url.id).await?;
                info!(
                    "Expired short URL '{}' (domain {}) auto-deleted",
                    url.short_code, url.domain_id
                );
            }
            return Err(AppError::expired("This short URL has expired"));
        }

        Ok(url)
    }

    #[instrument(skip(self), fields(host = %host, code = %code))]
    pub async fn resolve(&self, host: &str, code: &str) -> Result<Resolution> {
        let url = self.lookup(host, code).await?;

        if url.has_passcode() {
            debug!("Passcode challenge for '{}'", code);
            return Ok(Resolution::Challenge(url));
        }

        self.storage.increment_clicks(url.id).await?;
        Ok(Resolution::Redirect(url.original_url))
    }

    /// `captcha_passed` 由调用方根据会话中的验证码计算（未启用验证码时为 true）
    #[instrument(skip(self, passcode), fields(host = %host, code = %code))]
    pub async fn verify(
        &self,
        host: &str,
        code: &str,
        passcode: &str,
        captcha_passed: bool,
    ) -> Result<VerifyOutcome> {
        let url = self.lookup(host, code).await?;
        let expected = match url.passcode.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => return Err(AppError::not_found("Short URL not found")),
        };

        if !captcha_passed {
            return Ok(VerifyOutcome::WrongCaptcha(url));
        }

        if !bool::from(expected.as_bytes().ct_eq(passcode.as_bytes())) {
            debug!("Wrong passcode for '{}'", code);
            return Ok(VerifyOutcome::WrongPasscode(url));
        }

        self.storage.increment_clicks(url.id).await?;
        Ok(VerifyOutcome::Redirect(url.original_url))
    }
}
