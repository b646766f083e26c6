//! HTTP front end
//!
//! - [`session`]: cookie 会话与提示消息
//! - [`middleware`]: request id、登录/超级管理员守卫
//! - [`services`]: 各端点
//!
//! [`build_app`] 组装完整应用，服务器和集成测试共用。

pub mod middleware;
pub mod services;
pub mod session;

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{Compress, DefaultHeaders};
use actix_web::{App, HttpRequest, ResponseError, web};
use tracing::debug;

use crate::config::{SessionConfig, SiteSettingsStore, StaticConfig};
use crate::errors::AppError;
use crate::services::{AuthService, DomainService, RedirectService, UrlService, UserService};
use crate::storage::SeaOrmStorage;
use middleware::RequestIdMiddleware;
use session::{SessionMiddleware, SessionStore};

/// 表单体积上限
const FORM_LIMIT: usize = 64 * 1024;

/// 各 worker 共享的应用状态
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<SeaOrmStorage>,
    pub settings: Arc<SiteSettingsStore>,
    pub sessions: SessionStore,
    pub session_config: SessionConfig,
    pub login_rate_limit: bool,
    pub auth: Arc<AuthService>,
    pub urls: Arc<UrlService>,
    pub users: Arc<UserService>,
    pub domains: Arc<DomainService>,
    pub redirects: Arc<RedirectService>,
}

impl AppState {
    pub fn new(
        storage: Arc<SeaOrmStorage>,
        settings: Arc<SiteSettingsStore>,
        config: &StaticConfig,
    ) -> Self {
        Self {
            auth: Arc::new(AuthService::new(storage.clone())),
            urls: Arc::new(UrlService::new(storage.clone(), settings.clone())),
            users: Arc::new(UserService::new(storage.clone())),
            domains: Arc::new(DomainService::new(storage.clone())),
            redirects: Arc::new(RedirectService::new(storage.clone(), settings.clone())),
            sessions: SessionStore::from_config(&config.session),
            session_config: config.session.clone(),
            login_rate_limit: config.server.login_rate_limit,
            storage,
            settings,
        }
    }
}

/// 未匹配的路由
async fn not_found() -> Result<&'static str, AppError> {
    Err(AppError::not_found("Page not found"))
}

fn form_config() -> web::FormConfig {
    web::FormConfig::default()
        .limit(FORM_LIMIT)
        .error_handler(|err, req: &HttpRequest| {
            debug!("Malformed form on {}: {}", req.path(), err);
            let response = AppError::validation("Malformed form submission").error_response();
            actix_web::error::InternalError::from_response(err, response).into()
        })
}

/// 注册全部路由，短链接通配路由放在最后
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::Data::new(state.storage.clone()))
        .app_data(web::Data::new(state.settings.clone()))
        .app_data(web::Data::new(state.auth.clone()))
        .app_data(web::Data::new(state.urls.clone()))
        .app_data(web::Data::new(state.users.clone()))
        .app_data(web::Data::new(state.domains.clone()))
        .app_data(web::Data::new(state.redirects.clone()))
        .app_data(form_config())
        .route("/", web::get().to(services::home::index))
        .route("/static/{file:.*}", web::get().to(services::assets::serve));

    services::auth_routes(cfg, state.login_rate_limit);

    cfg.configure(services::admin_routes)
        .route("/{short_code}", web::get().to(services::redirect::follow))
        .route("/{short_code}", web::post().to(services::redirect::verify));
}

/// 组装应用：request id（最外层）、压缩、会话，然后是路由
pub fn build_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session = SessionMiddleware::new(state.sessions.clone(), state.session_config.clone());
    App::new()
        .wrap(session)
        .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
        .wrap(Compress::default())
        .wrap(RequestIdMiddleware)
        .configure(|cfg| configure(cfg, &state))
        .default_service(web::to(not_found))
}
