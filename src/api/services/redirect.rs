//! 短链接跳转与密码验证

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use tracing::trace;

use super::helpers::{moved_permanently, render_page};
use crate::api::session::Session;
use crate::config::{SiteSettings, SiteSettingsStore};
use crate::errors::Result;
use crate::services::{RedirectService, Resolution, VerifyOutcome};
use crate::storage::ShortUrl;
use crate::utils::captcha::{Captcha, verify_answer};
use crate::views::auth::{VerifyPage, render_verify};

#[derive(Debug, Deserialize)]
pub struct PasscodeForm {
    #[serde(default)]
    pub passcode: String,
    pub captcha: Option<String>,
}

fn request_host(req: &HttpRequest) -> String {
    req.connection_info().host().to_string()
}

/// 密码页：启用验证码时生成新的验证码写入会话
fn challenge_page(
    session: &Session,
    settings: &SiteSettings,
    url: &ShortUrl,
    error: Option<&str>,
) -> HttpResponse {
    let captcha = settings.captcha.enabled.then(|| {
        let captcha = Captcha::generate(settings.captcha.kind, settings.captcha.length);
        session.set_verify_captcha(captcha.text.clone());
        captcha.svg
    });

    render_page(session, settings, "Protected link", |ctx| {
        render_verify(
            ctx,
            &VerifyPage {
                short_code: &url.short_code,
                captcha_svg: captcha.as_deref(),
                error,
            },
        )
    })
}

/// GET /{short_code}
pub async fn follow(
    req: HttpRequest,
    path: web::Path<String>,
    session: Session,
    redirects: web::Data<Arc<RedirectService>>,
    settings: web::Data<Arc<SiteSettingsStore>>,
) -> Result<HttpResponse> {
    let code = path.into_inner();
    let host = request_host(&req);
    trace!("Redirect request {} on {}", code, host);

    match redirects.resolve(&host, &code).await? {
        Resolution::Redirect(target) => Ok(moved_permanently(&target)),
        Resolution::Challenge(url) => Ok(challenge_page(
            &session,
            &settings.get(),
            &url,
            None,
        )),
    }
}

/// POST /{short_code}
pub async fn verify(
    req: HttpRequest,
    path: web::Path<String>,
    session: Session,
    form: web::Form<PasscodeForm>,
    redirects: web::Data<Arc<RedirectService>>,
    settings: web::Data<Arc<SiteSettingsStore>>,
) -> Result<HttpResponse> {
    let code = path.into_inner();
    let host = request_host(&req);
    let current = settings.get();

    let captcha_passed = !current.captcha.enabled
        || verify_answer(session.verify_captcha().as_deref(), form.captcha.as_deref());

    match redirects
        .verify(&host, &code, &form.passcode, captcha_passed)
        .await?
    {
        VerifyOutcome::Redirect(target) => {
            session.clear_verify_captcha();
            Ok(moved_permanently(&target))
        }
        VerifyOutcome::WrongCaptcha(url) => Ok(challenge_page(
            &session,
            &current,
            &url,
            Some("Incorrect captcha, please try again"),
        )),
        VerifyOutcome::WrongPasscode(url) => Ok(challenge_page(
            &session,
            &current,
            &url,
            Some("Incorrect passcode"),
        )),
    }
}
