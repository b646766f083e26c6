use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// 基础域名的 domain_id
pub const BASE_DOMAIN_ID: i32 = 0;

/// 账号角色
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    #[strum(serialize = "superadmin")]
    SuperAdmin,
}

/// 账号状态
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Disabled,
}

impl AccountStatus {
    pub fn toggled(self) -> Self {
        match self {
            AccountStatus::Active => AccountStatus::Disabled,
            AccountStatus::Disabled => AccountStatus::Active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortUrl {
    pub id: i32,
    pub original_url: String,
    pub short_code: String,
    pub passcode: Option<String>,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub user_id: i32,
    pub domain_id: i32,
    pub auto_delete: bool,
}

impl ShortUrl {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry < now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn has_passcode(&self) -> bool {
        self.passcode.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// 写入短链接所需的字段（新增和编辑共用）
#[derive(Debug, Clone)]
pub struct ShortUrlDraft {
    pub original_url: String,
    pub short_code: String,
    pub passcode: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub domain_id: i32,
    pub auto_delete: bool,
}

/// 账号（password 为 Argon2 哈希，不序列化输出）
#[derive(Debug, Clone, Serialize)]
pub struct Admin {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub quota: i32,
    pub role: Role,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

impl Admin {
    pub fn is_superadmin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    pub id: i32,
    pub domain_name: String,
    pub added_by_user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}
