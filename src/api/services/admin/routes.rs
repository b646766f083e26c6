//! 管理后台路由 `/admin`
//!
//! 整个 scope 需要登录；users、domains、settings 子 scope 额外要求超级管理员。

use actix_web::web;

use super::dashboard::{add_url, admin_root, dashboard, delete_url, edit_url, update_profile};
use super::domains::{add_domain, delete_domain, domains_page};
use super::settings::{settings_page, update_settings};
use super::users::{add_user, delete_user, edit_user, toggle_status, users_page};
use crate::api::middleware::AdminGuard;

/// 短链接管理 `/urls`
fn urls_routes() -> actix_web::Scope {
    web::scope("/urls")
        .route("/add", web::post().to(add_url))
        .route("/edit", web::post().to(edit_url))
        .route("/delete", web::post().to(delete_url))
}

/// 账号管理 `/users`
fn users_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .wrap(AdminGuard::superadmin_required())
            .route("", web::get().to(users_page))
            .route("/add", web::post().to(add_user))
            .route("/edit", web::post().to(edit_user))
            .route("/delete", web::post().to(delete_user))
            .route("/toggle-status", web::post().to(toggle_status)),
    );
}

/// 自定义域名 `/domains`
fn domains_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/domains")
            .wrap(AdminGuard::superadmin_required())
            .route("", web::get().to(domains_page))
            .route("/add", web::post().to(add_domain))
            .route("/delete", web::post().to(delete_domain)),
    );
}

/// 站点设置 `/settings`
fn settings_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/settings")
            .wrap(AdminGuard::superadmin_required())
            .route("", web::get().to(settings_page))
            .route("/update", web::post().to(update_settings)),
    );
}

/// 挂载 `/admin` 及其子路由
pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(AdminGuard::login_required())
            .route("", web::get().to(admin_root))
            .route("/", web::get().to(admin_root))
            .route("/dashboard", web::get().to(dashboard))
            .route("/profile/update", web::post().to(update_profile))
            .service(urls_routes())
            .configure(users_routes)
            .configure(domains_routes)
            .configure(settings_routes),
    );
}
