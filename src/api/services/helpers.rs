//! Handler 公共工具：重定向、页面渲染、提示消息

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::LOCATION;
use tracing::error;

use crate::api::session::Session;
use crate::config::SiteSettings;
use crate::errors::Result;
use crate::views::PageContext;

pub fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .finish()
}

/// 301 到目标地址（短链接跳转）
pub fn moved_permanently(location: &str) -> HttpResponse {
    HttpResponse::MovedPermanently()
        .insert_header((LOCATION, location))
        .finish()
}

pub fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// 渲染带布局的页面，并消费会话中的提示消息
pub fn render_page(
    session: &Session,
    settings: &SiteSettings,
    title: &str,
    render: impl FnOnce(&PageContext<'_>) -> String,
) -> HttpResponse {
    let user = session.user();
    let flashes = session.take_flashes();
    let ctx = PageContext {
        site_name: &settings.site_name,
        title,
        user: user.as_ref(),
        flashes: &flashes,
    };
    html(StatusCode::OK, render(&ctx))
}

/// 把操作结果写成提示消息：成功用 `success`，用户可见的错误原样展示，内部错误记录日志后展示 `failure`
pub fn flash_outcome<T>(
    session: &Session,
    result: Result<T>,
    success: impl FnOnce(T) -> String,
    failure: &str,
) -> bool {
    match result {
        Ok(value) => {
            session.flash_success(success(value));
            true
        }
        Err(e) if e.is_user_facing() => {
            session.flash_error(e.message());
            false
        }
        Err(e) => {
            error!("{}: {}", failure, e);
            session.flash_error(failure);
            false
        }
    }
}

/// HTML checkbox：勾选时浏览器提交 "on"
pub fn is_checked(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("on" | "true" | "1" | "yes")
    )
}
