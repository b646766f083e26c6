//! 管理后台端点
//!
//! 所有写操作的结果都以提示消息 + 重定向的形式返回。

mod dashboard;
mod domains;
pub mod routes;
mod settings;
mod users;

use serde::Deserialize;

use crate::api::session::Session;
use crate::errors::{AppError, Result};
use crate::services::CurrentUser;

pub use routes::admin_routes;

/// 只携带 id 的表单（删除、切换状态）
#[derive(Debug, Deserialize)]
pub struct IdForm {
    pub id: i32,
}

/// 守卫已保证登录，这里只是取出会话中的账号
fn session_user(session: &Session) -> Result<CurrentUser> {
    session
        .user()
        .ok_or_else(|| AppError::forbidden("Please sign in first"))
}
