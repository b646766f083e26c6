//! Cookie-backed server-side sessions
//!
//! 会话数据保存在进程内的 moka 缓存中（按空闲时间过期），Cookie 只携带随机 UUID。
//! 中间件在请求进入时加载会话，响应时仅在会话被修改或销毁后写回/删除 Cookie。

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use actix_service::{Service, Transform};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::services::CurrentUser;

const MAX_SESSIONS: u64 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlashKind {
    Success,
    Error,
}

/// 一次性提示消息，下一次页面渲染时展示并清除
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub user: Option<CurrentUser>,
    /// 登录页验证码答案
    pub captcha: Option<String>,
    /// 短链接密码页验证码答案
    pub verify_captcha: Option<String>,
    pub flashes: Vec<Flash>,
}

/// 进程内会话存储
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache<String, SessionState>,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(MAX_SESSIONS)
                .time_to_idle(idle_timeout)
                .build(),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(Duration::from_secs(config.max_age_days.max(1) * 24 * 3600))
    }

    pub fn load(&self, id: &str) -> Option<SessionState> {
        self.cache.get(id)
    }

    pub fn save(&self, id: String, state: SessionState) {
        self.cache.insert(id, state);
    }

    pub fn remove(&self, id: &str) {
        self.cache.invalidate(id);
    }

    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionStatus {
    Unchanged,
    Changed,
    /// 登录后更换会话 id，防止会话固定
    Renewed,
    Purged,
}

struct SessionInner {
    id: Option<String>,
    state: SessionState,
    status: SessionStatus,
}

/// 当前请求的会话句柄，从 request extensions 中提取
#[derive(Clone)]
pub struct Session(Rc<RefCell<SessionInner>>);

impl Session {
    fn new(id: Option<String>, state: SessionState) -> Self {
        Session(Rc::new(RefCell::new(SessionInner {
            id,
            state,
            status: SessionStatus::Unchanged,
        })))
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut inner = self.0.borrow_mut();
        if inner.status == SessionStatus::Unchanged {
            inner.status = SessionStatus::Changed;
        }
        f(&mut inner.state)
    }

    pub fn user(&self) -> Option<CurrentUser> {
        self.0.borrow().state.user.clone()
    }

    /// 登录成功：写入用户并更换会话 id
    pub fn login(&self, user: CurrentUser) {
        let mut inner = self.0.borrow_mut();
        inner.state.user = Some(user);
        inner.state.captcha = None;
        inner.status = SessionStatus::Renewed;
    }

    /// 按数据库中的最新账号信息更新会话用户，不更换会话 id
    pub fn refresh_user(&self, user: CurrentUser) {
        if self.0.borrow().state.user.as_ref() == Some(&user) {
            return;
        }
        self.mutate(|s| s.user = Some(user));
    }

    /// 清空会话并删除 Cookie
    pub fn destroy(&self) {
        let mut inner = self.0.borrow_mut();
        inner.state = SessionState::default();
        inner.status = SessionStatus::Purged;
    }

    pub fn set_captcha(&self, answer: String) {
        self.mutate(|s| s.captcha = Some(answer));
    }

    pub fn captcha(&self) -> Option<String> {
        self.0.borrow().state.captcha.clone()
    }

    pub fn set_verify_captcha(&self, answer: String) {
        self.mutate(|s| s.verify_captcha = Some(answer));
    }

    pub fn verify_captcha(&self) -> Option<String> {
        self.0.borrow().state.verify_captcha.clone()
    }

    pub fn clear_verify_captcha(&self) {
        self.mutate(|s| s.verify_captcha = None);
    }

    pub fn flash_success(&self, message: impl Into<String>) {
        self.push_flash(FlashKind::Success, message.into());
    }

    pub fn flash_error(&self, message: impl Into<String>) {
        self.push_flash(FlashKind::Error, message.into());
    }

    fn push_flash(&self, kind: FlashKind, message: String) {
        self.mutate(|s| s.flashes.push(Flash { kind, message }));
    }

    /// 取出并清空所有提示消息
    pub fn take_flashes(&self) -> Vec<Flash> {
        if self.0.borrow().state.flashes.is_empty() {
            return Vec::new();
        }
        self.mutate(|s| std::mem::take(&mut s.flashes))
    }

    fn get_session(req: &HttpRequest) -> Session {
        match req.extensions().get::<Session>() {
            Some(session) => session.clone(),
            None => {
                // 未挂载中间件时返回一个不会被持久化的空会话
                warn!("Session requested without SessionMiddleware");
                Session::new(None, SessionState::default())
            }
        }
    }
}

impl FromRequest for Session {
    type Error = Error;
    type Future = Ready<Result<Session, Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Session::get_session(req)))
    }
}

/// Session 中间件工厂
#[derive(Clone)]
pub struct SessionMiddleware {
    store: SessionStore,
    config: SessionConfig,
}

impl SessionMiddleware {
    pub fn new(store: SessionStore, config: SessionConfig) -> Self {
        Self { store, config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionService {
            service: Rc::new(service),
            store: self.store.clone(),
            config: Rc::new(self.config.clone()),
        }))
    }
}

pub struct SessionService<S> {
    service: Rc<S>,
    store: SessionStore,
    config: Rc<SessionConfig>,
}

impl<S, B> Service<ServiceRequest> for SessionService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let store = self.store.clone();
        let config = self.config.clone();

        // 只接受仍存在于存储中的会话 id
        let (id, state) = match req
            .cookie(&config.cookie_name)
            .map(|c| c.value().to_string())
            .and_then(|id| store.load(&id).map(|state| (id, state)))
        {
            Some((id, state)) => (Some(id), state),
            None => (None, SessionState::default()),
        };

        let session = Session::new(id, state);
        req.extensions_mut().insert(session.clone());

        Box::pin(async move {
            let mut response = srv.call(req).await?;

            let (old_id, state, status) = {
                let inner = session.0.borrow();
                (inner.id.clone(), inner.state.clone(), inner.status)
            };

            let cookie = match status {
                SessionStatus::Unchanged => None,
                SessionStatus::Changed => {
                    let id = old_id.unwrap_or_else(|| Uuid::new_v4().to_string());
                    store.save(id.clone(), state);
                    Some(build_cookie(&config, id))
                }
                SessionStatus::Renewed => {
                    if let Some(old) = old_id {
                        store.remove(&old);
                    }
                    let id = Uuid::new_v4().to_string();
                    debug!("Session renewed");
                    store.save(id.clone(), state);
                    Some(build_cookie(&config, id))
                }
                SessionStatus::Purged => {
                    if let Some(old) = old_id {
                        store.remove(&old);
                    }
                    Some(build_removal_cookie(&config))
                }
            };

            if let Some(cookie) = cookie
                && let Err(e) = response.response_mut().add_cookie(&cookie)
            {
                warn!("Failed to set session cookie: {}", e);
            }

            Ok(response)
        })
    }
}

fn build_cookie(config: &SessionConfig, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(config.cookie_name.clone(), value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(config.secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(actix_web::cookie::time::Duration::days(
        config.max_age_days as i64,
    ));
    cookie
}

fn build_removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    let mut cookie = build_cookie(config, String::new());
    cookie.set_max_age(actix_web::cookie::time::Duration::ZERO);
    cookie
}
