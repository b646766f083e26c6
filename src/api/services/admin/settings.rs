use std::sync::Arc;

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::info;

use super::session_user;
use crate::api::services::helpers::{flash_outcome, is_checked, redirect_to, render_page};
use crate::api::session::Session;
use crate::config::{SettingsUpdate, SiteSettingsStore};
use crate::errors::Result;

const SETTINGS_PATH: &str = "/admin/settings";

#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    #[serde(rename = "siteName")]
    pub site_name: Option<String>,
    #[serde(rename = "baseUrl")]
    pub base_url: Option<String>,
    pub captcha_enabled: Option<String>,
    pub captcha_type: Option<String>,
    pub captcha_length: Option<String>,
}

impl From<SettingsForm> for SettingsUpdate {
    fn from(form: SettingsForm) -> Self {
        SettingsUpdate {
            site_name: form.site_name,
            base_url: form.base_url,
            captcha_enabled: is_checked(form.captcha_enabled.as_deref()),
            captcha_type: form.captcha_type,
            captcha_length: form.captcha_length,
        }
    }
}

/// GET /admin/settings
pub async fn settings_page(
    session: Session,
    settings: web::Data<Arc<SiteSettingsStore>>,
) -> HttpResponse {
    let current = settings.get();
    render_page(&session, &current, "Settings", |ctx| {
        crate::views::admin::settings::render(ctx, &current)
    })
}

/// POST /admin/settings/update：写入 JSON 覆盖文件并立即生效
pub async fn update_settings(
    session: Session,
    form: web::Form<SettingsForm>,
    settings: web::Data<Arc<SiteSettingsStore>>,
) -> Result<HttpResponse> {
    let actor = session_user(&session)?;
    let result = settings.update(form.into_inner().into());
    if result.is_ok() {
        info!(
            "Superadmin '{}' updated site settings ({})",
            actor.username,
            settings.path().display()
        );
    }
    flash_outcome(
        &session,
        result,
        |_| "Settings updated".to_string(),
        "Failed to save settings",
    );
    Ok(redirect_to(SETTINGS_PATH))
}
