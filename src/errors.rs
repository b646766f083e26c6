use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

#[derive(Debug, Clone)]
pub enum AppError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Expired(String),
    Forbidden(String),
    Conflict(String),
    QuotaExceeded(String),
    AuthFailed(String),
    AccountDisabled(String),
    PasswordHash(String),
    Serialization(String),
    DateParse(String),
}

impl AppError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DatabaseConfig(_) => "E001",
            AppError::DatabaseConnection(_) => "E002",
            AppError::DatabaseOperation(_) => "E003",
            AppError::FileOperation(_) => "E004",
            AppError::Validation(_) => "E005",
            AppError::NotFound(_) => "E006",
            AppError::Expired(_) => "E007",
            AppError::Forbidden(_) => "E008",
            AppError::Conflict(_) => "E009",
            AppError::QuotaExceeded(_) => "E010",
            AppError::AuthFailed(_) => "E011",
            AppError::AccountDisabled(_) => "E012",
            AppError::PasswordHash(_) => "E013",
            AppError::Serialization(_) => "E014",
            AppError::DateParse(_) => "E015",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::DatabaseConfig(_) => "Database Configuration Error",
            AppError::DatabaseConnection(_) => "Database Connection Error",
            AppError::DatabaseOperation(_) => "Database Operation Error",
            AppError::FileOperation(_) => "File Operation Error",
            AppError::Validation(_) => "Validation Error",
            AppError::NotFound(_) => "Resource Not Found",
            AppError::Expired(_) => "Resource Expired",
            AppError::Forbidden(_) => "Permission Denied",
            AppError::Conflict(_) => "Conflict",
            AppError::QuotaExceeded(_) => "Quota Exceeded",
            AppError::AuthFailed(_) => "Authentication Failed",
            AppError::AccountDisabled(_) => "Account Disabled",
            AppError::PasswordHash(_) => "Password Hash Error",
            AppError::Serialization(_) => "Serialization Error",
            AppError::DateParse(_) => "Date Parse Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            AppError::DatabaseConfig(msg)
            | AppError::DatabaseConnection(msg)
            | AppError::DatabaseOperation(msg)
            | AppError::FileOperation(msg)
            | AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Expired(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg)
            | AppError::QuotaExceeded(msg)
            | AppError::AuthFailed(msg)
            | AppError::AccountDisabled(msg)
            | AppError::PasswordHash(msg)
            | AppError::Serialization(msg)
            | AppError::DateParse(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::DateParse(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Expired(_) => StatusCode::GONE,
            AppError::Forbidden(_) | AppError::QuotaExceeded(_) | AppError::AccountDisabled(_) => {
                StatusCode::FORBIDDEN
            }
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::AuthFailed(_) => StatusCode::UNAUTHORIZED,
            AppError::DatabaseConfig(_)
            | AppError::DatabaseConnection(_)
            | AppError::DatabaseOperation(_)
            | AppError::FileOperation(_)
            | AppError::PasswordHash(_)
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 是否可以直接展示给终端用户（内部错误只展示通用提示）
    pub fn is_user_facing(&self) -> bool {
        !self.http_status().is_server_error()
    }

    /// 格式化为彩色输出（用于 CLI 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for AppError {}

// 便捷的构造函数
impl AppError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        AppError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        AppError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        AppError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        AppError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn expired<T: Into<String>>(msg: T) -> Self {
        AppError::Expired(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn quota_exceeded<T: Into<String>>(msg: T) -> Self {
        AppError::QuotaExceeded(msg.into())
    }

    pub fn auth_failed<T: Into<String>>(msg: T) -> Self {
        AppError::AuthFailed(msg.into())
    }

    pub fn account_disabled<T: Into<String>>(msg: T) -> Self {
        AppError::AccountDisabled(msg.into())
    }

    pub fn password_hash<T: Into<String>>(msg: T) -> Self {
        AppError::PasswordHash(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        AppError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        AppError::DateParse(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        AppError::DateParse(err.to_string())
    }
}

impl From<crate::utils::password::PasswordError> for AppError {
    fn from(err: crate::utils::password::PasswordError) -> Self {
        AppError::PasswordHash(err.to_string())
    }
}

/// 未被 handler 处理的错误统一渲染为错误页，状态码透传
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.http_status();
        if status.is_server_error() {
            tracing::error!("Unhandled error {}: {}", self.code(), self);
        }

        let message = if self.is_user_facing() {
            self.message()
        } else {
            "Internal Server Error"
        };

        let settings = crate::config::try_get_site_settings();
        let site_name = settings
            .as_ref()
            .map(|s| s.site_name.as_str())
            .unwrap_or(crate::config::DEFAULT_SITE_NAME);

        HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(crate::views::error::render_standalone(
                site_name,
                status.as_u16(),
                message,
            ))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
