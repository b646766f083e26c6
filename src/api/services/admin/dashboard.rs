use std::sync::Arc;

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::warn;

use super::{IdForm, session_user};
use crate::api::middleware::auth::{DASHBOARD_PATH, LOGIN_PATH};
use crate::api::services::helpers::{flash_outcome, is_checked, redirect_to, render_page};
use crate::api::session::Session;
use crate::config::SiteSettingsStore;
use crate::errors::{AppError, Result};
use crate::services::{AuthService, ProfileInput, UrlInput, UrlService};
use crate::storage::BASE_DOMAIN_ID;

#[derive(Debug, Deserialize)]
pub struct UrlForm {
    pub id: Option<i32>,
    #[serde(default)]
    pub original_url: String,
    pub short_code: Option<String>,
    pub passcode: Option<String>,
    pub expiry_date: Option<String>,
    pub domain_id: Option<String>,
    pub auto_delete: Option<String>,
}

impl UrlForm {
    fn into_input(self) -> Result<UrlInput> {
        let domain_id = match self.domain_id.as_deref().map(str::trim) {
            None | Some("") => BASE_DOMAIN_ID,
            Some(s) => s
                .parse()
                .map_err(|_| AppError::validation("Invalid domain"))?,
        };
        Ok(UrlInput {
            original_url: self.original_url,
            short_code: self.short_code,
            passcode: self.passcode,
            expiry_date: self.expiry_date,
            domain_id,
            auto_delete: is_checked(self.auto_delete.as_deref()),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    pub username: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
    #[serde(default)]
    pub current_password: String,
}

/// GET /admin, GET /admin/
pub async fn admin_root() -> HttpResponse {
    redirect_to(DASHBOARD_PATH)
}

/// GET /admin/dashboard
pub async fn dashboard(
    session: Session,
    urls: web::Data<Arc<UrlService>>,
    settings: web::Data<Arc<SiteSettingsStore>>,
) -> Result<HttpResponse> {
    let user = session_user(&session)?;
    let data = match urls.dashboard(&user).await {
        Ok(data) => data,
        Err(AppError::NotFound(_)) => {
            // 账号已被删除，会话作废
            warn!("Session user '{}' no longer exists", user.username);
            session.destroy();
            return Ok(redirect_to(LOGIN_PATH));
        }
        Err(e) => return Err(e),
    };

    Ok(render_page(&session, &settings.get(), "Dashboard", |ctx| {
        crate::views::admin::dashboard::render(ctx, &data)
    }))
}

/// POST /admin/urls/add
pub async fn add_url(
    session: Session,
    form: web::Form<UrlForm>,
    urls: web::Data<Arc<UrlService>>,
) -> Result<HttpResponse> {
    let user = session_user(&session)?;
    let result = async {
        let input = form.into_inner().into_input()?;
        urls.create(&user, input).await
    }
    .await;

    flash_outcome(
        &session,
        result,
        |url| format!("Short URL '{}' created", url.short_code),
        "Failed to create short URL",
    );
    Ok(redirect_to(DASHBOARD_PATH))
}

/// POST /admin/urls/edit
pub async fn edit_url(
    session: Session,
    form: web::Form<UrlForm>,
    urls: web::Data<Arc<UrlService>>,
) -> Result<HttpResponse> {
    let user = session_user(&session)?;
    let result = async {
        let form = form.into_inner();
        let id = form
            .id
            .ok_or_else(|| AppError::validation("Missing short URL id"))?;
        urls.edit(&user, id, form.into_input()?).await
    }
    .await;

    flash_outcome(
        &session,
        result,
        |url| format!("Short URL '{}' updated", url.short_code),
        "Failed to update short URL",
    );
    Ok(redirect_to(DASHBOARD_PATH))
}

/// POST /admin/urls/delete
pub async fn delete_url(
    session: Session,
    form: web::Form<IdForm>,
    urls: web::Data<Arc<UrlService>>,
) -> Result<HttpResponse> {
    let user = session_user(&session)?;
    let result = urls.delete(&user, form.id).await;
    flash_outcome(
        &session,
        result,
        |_| "Short URL deleted".to_string(),
        "Failed to delete short URL",
    );
    Ok(redirect_to(DASHBOARD_PATH))
}

/// POST /admin/profile/update：成功后销毁会话，要求重新登录
pub async fn update_profile(
    session: Session,
    form: web::Form<ProfileForm>,
    auth: web::Data<Arc<AuthService>>,
) -> Result<HttpResponse> {
    let user = session_user(&session)?;
    let form = form.into_inner();
    let input = ProfileInput {
        username: form.username,
        new_password: form.new_password,
        confirm_password: form.confirm_password,
        current_password: form.current_password,
    };

    match auth.update_profile(user.id, input).await {
        Ok(_) => {
            session.destroy();
            Ok(redirect_to("/login?message=ProfileUpdated"))
        }
        result @ Err(_) => {
            flash_outcome(&session, result, |_| String::new(), "Failed to update profile");
            Ok(redirect_to(DASHBOARD_PATH))
        }
    }
}
