//! 登录、登出、验证码端点与登录限流

use std::net::IpAddr;
use std::sync::Arc;

use actix_governor::{Governor, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::{HttpResponse, web};
use governor::middleware::NoOpMiddleware;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::helpers::{redirect_to, render_page};
use crate::api::middleware::auth::{DASHBOARD_PATH, LOGIN_PATH};
use crate::api::session::Session;
use crate::config::{SiteSettings, SiteSettingsStore, get_config};
use crate::errors::Result;
use crate::services::{AuthService, CurrentUser};
use crate::utils::captcha::{Captcha, verify_answer};
use crate::views::auth::{LoginPage, render_login};

const PROFILE_UPDATED_NOTICE: &str = "Your profile has been updated. Please sign in again.";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub captcha: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub message: Option<String>,
}

/// 基于 IP 地址的限流 key 提取器
///
/// 默认使用连接 IP（peer_addr）；连接来自配置的可信代理时使用 X-Forwarded-For
#[derive(Clone, Copy)]
pub struct LoginKeyExtractor;

impl KeyExtractor for LoginKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> std::result::Result<Self::Key, Self::KeyExtractionError> {
        let conn_info = req.connection_info();

        let peer_ip = conn_info
            .peer_addr()
            .ok_or_else(|| SimpleKeyExtractionError::new("Unable to extract peer IP"))?;

        let config = get_config();
        let trusted_proxies = &config.server.trusted_proxies;

        if !trusted_proxies.is_empty() && is_trusted_proxy(peer_ip, trusted_proxies) {
            let real_ip = conn_info.realip_remote_addr().unwrap_or(peer_ip);
            debug!("Login rate limit key from trusted proxy: {}", real_ip);
            Ok(real_ip.to_string())
        } else {
            Ok(peer_ip.to_string())
        }
    }
}

fn is_trusted_proxy(ip: &str, trusted_proxies: &[String]) -> bool {
    let Ok(ip_addr) = ip.parse::<IpAddr>() else {
        return false;
    };

    trusted_proxies.iter().any(|proxy| {
        if proxy.contains('/') {
            ip_in_cidr(&ip_addr, proxy)
        } else {
            proxy.parse::<IpAddr>().is_ok_and(|p| p == ip_addr)
        }
    })
}

fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.split_once('/') else {
        return false;
    };
    let Ok(prefix_len) = prefix_len.parse::<u32>() else {
        return false;
    };
    let Ok(network_addr) = network.parse::<IpAddr>() else {
        return false;
    };

    match (ip, network_addr) {
        (IpAddr::V4(ip), IpAddr::V4(net)) if prefix_len <= 32 => {
            let mask = u32::MAX.checked_shl(32 - prefix_len).unwrap_or(0);
            (u32::from(*ip) & mask) == (u32::from(net) & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) if prefix_len <= 128 => {
            let mask = u128::MAX.checked_shl(128 - prefix_len).unwrap_or(0);
            (u128::from(*ip) & mask) == (u128::from(net) & mask)
        }
        _ => false,
    }
}

/// 登录限流器：每秒补充 1 个令牌，突发最多 5 次，超限返回 429
pub fn login_rate_limiter() -> Option<Governor<LoginKeyExtractor, NoOpMiddleware>> {
    let config = GovernorConfigBuilder::default()
        .seconds_per_request(1)
        .burst_size(5)
        .key_extractor(LoginKeyExtractor)
        .finish()?;

    debug!("Login rate limiter created: 1 req/s, burst 5");
    Some(Governor::new(&config))
}

/// 渲染登录页；启用验证码时生成新的验证码写入会话
async fn login_form(
    session: &Session,
    settings: &SiteSettings,
    auth: &AuthService,
    notice: Option<&str>,
) -> Result<HttpResponse> {
    let bootstrap = !auth.has_admin().await?;
    let captcha = settings.captcha.enabled.then(|| {
        let captcha = Captcha::generate(settings.captcha.kind, settings.captcha.length);
        session.set_captcha(captcha.text.clone());
        captcha.svg
    });

    Ok(render_page(session, settings, "Login", |ctx| {
        render_login(
            ctx,
            &LoginPage {
                bootstrap,
                captcha_svg: captcha.as_deref(),
                notice,
            },
        )
    }))
}

/// GET /login
pub async fn login_page(
    session: Session,
    query: web::Query<LoginQuery>,
    auth: web::Data<Arc<AuthService>>,
    settings: web::Data<Arc<SiteSettingsStore>>,
) -> Result<HttpResponse> {
    if session.user().is_some() {
        return Ok(redirect_to(DASHBOARD_PATH));
    }
    let notice = (query.message.as_deref() == Some("ProfileUpdated")).then_some(PROFILE_UPDATED_NOTICE);
    login_form(&session, &settings.get(), &auth, notice).await
}

/// POST /login
pub async fn login(
    session: Session,
    form: web::Form<LoginForm>,
    auth: web::Data<Arc<AuthService>>,
    settings: web::Data<Arc<SiteSettingsStore>>,
) -> Result<HttpResponse> {
    let current = settings.get();

    if current.captcha.enabled {
        let expected = session.captcha();
        if !verify_answer(expected.as_deref(), form.captcha.as_deref()) {
            debug!("Login rejected: wrong captcha for '{}'", form.username);
            session.flash_error("Incorrect captcha, please try again");
            return login_form(&session, &current, &auth, None).await;
        }
    }

    match auth.login(&form.username, &form.password).await {
        Ok(outcome) => {
            let user = CurrentUser::from(&outcome.admin);
            session.login(user);
            if outcome.bootstrapped {
                info!("Superadmin '{}' bootstrapped on first login", outcome.admin.username);
                session.flash_success(format!(
                    "Superadmin account '{}' created. Welcome!",
                    outcome.admin.username
                ));
            }
            Ok(redirect_to(DASHBOARD_PATH))
        }
        Err(e) if e.is_user_facing() => {
            session.flash_error(e.message());
            login_form(&session, &current, &auth, None).await
        }
        Err(e) => Err(e),
    }
}

/// GET /logout
pub async fn logout(session: Session) -> HttpResponse {
    if let Some(user) = session.user() {
        info!("User '{}' logged out", user.username);
    }
    session.destroy();
    redirect_to(LOGIN_PATH)
}

/// GET /captcha：刷新登录验证码
pub async fn captcha(session: Session, settings: web::Data<Arc<SiteSettingsStore>>) -> HttpResponse {
    let current = settings.get();
    let captcha = Captcha::generate(current.captcha.kind, current.captcha.length);
    session.set_captcha(captcha.text);
    HttpResponse::Ok()
        .content_type("image/svg+xml")
        .insert_header(("Cache-Control", "no-store"))
        .body(captcha.svg)
}

/// 注册认证路由；`rate_limit` 为 true 时 POST /login 套上限流器
pub fn auth_routes(cfg: &mut web::ServiceConfig, rate_limit: bool) {
    let limiter = if rate_limit {
        let limiter = login_rate_limiter();
        if limiter.is_none() {
            warn!("Invalid login rate limit config, rate limiting disabled");
        }
        limiter
    } else {
        None
    };

    let post_login = match limiter {
        Some(limiter) => web::post().to(login).wrap(limiter),
        None => web::post().to(login),
    };

    cfg.route(LOGIN_PATH, web::get().to(login_page))
        .route(LOGIN_PATH, post_login)
        .route("/logout", web::get().to(logout))
        .route("/captcha", web::get().to(captcha));
}
