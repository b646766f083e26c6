//! Shared helpers for the integration tests
//!
//! 每个测试使用独立的临时 SQLite 数据库和设置文件。

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::LOCATION;
use linkhub::config::{SettingsUpdate, SiteSettingsStore, StaticConfig};
use linkhub::services::CurrentUser;
use linkhub::storage::{Admin, NewAdmin, Role, SeaOrmStorage, ShortUrlDraft, BASE_DOMAIN_ID};
use linkhub::utils::password::hash_password;
use tempfile::TempDir;

pub struct TestEnv {
    pub storage: Arc<SeaOrmStorage>,
    pub settings: Arc<SiteSettingsStore>,
    pub dir: TempDir,
}

/// 临时数据库 + 关闭验证码的站点设置
pub async fn setup() -> TestEnv {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite")
            .await
            .expect("Failed to create storage"),
    );

    let settings = Arc::new(SiteSettingsStore::load(dir.path().join("config.json")));
    settings
        .update(SettingsUpdate {
            captcha_enabled: false,
            ..Default::default()
        })
        .expect("Failed to disable captcha");

    TestEnv {
        storage,
        settings,
        dir,
    }
}

/// 测试不经过真实连接，没有 peer 地址，因此关闭登录限流
pub fn test_config() -> StaticConfig {
    let mut config = StaticConfig::default();
    config.server.login_rate_limit = false;
    config
}

pub async fn create_user(
    storage: &SeaOrmStorage,
    username: &str,
    password: &str,
    quota: i32,
    role: Role,
) -> Admin {
    storage
        .create_admin(NewAdmin {
            username: username.to_string(),
            password_hash: hash_password(password).expect("hash"),
            quota,
            role,
        })
        .await
        .expect("Failed to create user")
}

pub fn current(admin: &Admin) -> CurrentUser {
    CurrentUser::from(admin)
}

pub fn draft(code: &str, target: &str) -> ShortUrlDraft {
    ShortUrlDraft {
        original_url: target.to_string(),
        short_code: code.to_string(),
        passcode: None,
        expiry_date: None,
        domain_id: BASE_DOMAIN_ID,
        auto_delete: false,
    }
}

/// 响应中的会话 Cookie（若有）
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == "linkhub_session")
        .map(|c| c.into_owned())
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
