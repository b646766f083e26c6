//! 管理后台访问控制
//!
//! 未登录重定向到 /login；需要超级管理员的页面对普通用户写入提示并重定向到主控台。
//! 每个请求都按数据库中的账号刷新会话里的角色，账号被删除或停用时销毁会话。

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::LOCATION,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::session::Session;
use crate::services::CurrentUser;
use crate::storage::SeaOrmStorage;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// 访问控制中间件工厂
#[derive(Clone, Copy, Debug)]
pub struct AdminGuard {
    superadmin_only: bool,
}

impl AdminGuard {
    /// 任意已登录账号
    pub fn login_required() -> Self {
        Self {
            superadmin_only: false,
        }
    }

    /// 仅超级管理员
    pub fn superadmin_required() -> Self {
        Self {
            superadmin_only: true,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminGuardMiddleware {
            service: Rc::new(service),
            superadmin_only: self.superadmin_only,
        }))
    }
}

pub struct AdminGuardMiddleware<S> {
    service: Rc<S>,
    superadmin_only: bool,
}

impl<S, B> Service<ServiceRequest> for AdminGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
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
        let superadmin_only = self.superadmin_only;
        let session = req.extensions().get::<Session>().cloned();
        let storage = req.app_data::<web::Data<Arc<SeaOrmStorage>>>().cloned();

        Box::pin(async move {
            let Some((session, cached)) = session.and_then(|s| s.user().map(|u| (s, u))) else {
                debug!("Unauthenticated request to {}, redirecting to login", req.path());
                return Ok(req.into_response(redirect(LOGIN_PATH)).map_into_right_body());
            };

            let verified = req.extensions().get::<VerifiedAccount>().cloned();
            let user = match verified {
                Some(VerifiedAccount(user)) => user,
                None => match reload_account(storage.as_deref().map(|v| &**v), &cached).await? {
                    Some(user) => {
                        session.refresh_user(user.clone());
                        req.extensions_mut().insert(VerifiedAccount(user.clone()));
                        user
                    }
                    None => {
                        session.destroy();
                        return Ok(req.into_response(redirect(LOGIN_PATH)).map_into_right_body());
                    }
                },
            };

            if superadmin_only && !user.is_superadmin() {
                info!("User '{}' denied access to {}", user.username, req.path());
                session.flash_error("You do not have permission to access this page.");
                return Ok(req
                    .into_response(redirect(DASHBOARD_PATH))
                    .map_into_right_body());
            }

            let res = srv.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// 本次请求中已从数据库确认过的账号，嵌套的守卫不再重复查询
#[derive(Clone)]
struct VerifiedAccount(CurrentUser);

/// 按会话中的 id 重新读取账号；账号被删除或停用时返回 None
async fn reload_account(
    storage: Option<&Arc<SeaOrmStorage>>,
    cached: &CurrentUser,
) -> Result<Option<CurrentUser>, Error> {
    let Some(storage) = storage else {
        warn!("Account storage is not registered, refusing session");
        return Ok(None);
    };

    match storage.get_admin(cached.id).await? {
        Some(account) if account.is_active() => Ok(Some(CurrentUser::from(&account))),
        Some(_) => {
            info!("Session of disabled account '{}' dropped", cached.username);
            Ok(None)
        }
        None => {
            info!("Session of deleted account '{}' dropped", cached.username);
            Ok(None)
        }
    }
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .finish()
}
