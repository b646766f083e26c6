use std::str::FromStr;

use tracing::warn;

use crate::storage::models::{AccountStatus, Admin, Domain, Role, ShortUrl};
use migration::entities::{admin, domain, short_url};

pub fn model_to_short_url(model: short_url::Model) -> ShortUrl {
    ShortUrl {
        id: model.id,
        original_url: model.original_url,
        short_code: model.short_code,
        passcode: model.passcode.filter(|p| !p.is_empty()),
        clicks: model.clicks.max(0),
        created_at: model.created_at,
        expiry_date: model.expiry_date,
        user_id: model.user_id,
        domain_id: model.domain_id,
        auto_delete: model.auto_delete,
    }
}

/// 未知的 role/status 按最小权限处理
pub fn model_to_admin(model: admin::Model) -> Admin {
    let role = Role::from_str(&model.role).unwrap_or_else(|_| {
        warn!("Unknown role '{}' for admin {}", model.role, model.id);
        Role::User
    });
    let status = AccountStatus::from_str(&model.status).unwrap_or_else(|_| {
        warn!("Unknown status '{}' for admin {}", model.status, model.id);
        AccountStatus::Disabled
    });

    Admin {
        id: model.id,
        username: model.username,
        password: model.password,
        quota: model.quota,
        role,
        status,
        created_at: model.created_at,
    }
}

pub fn model_to_domain(model: domain::Model) -> Domain {
    Domain {
        id: model.id,
        domain_name: model.domain_name,
        added_by_user_id: model.added_by_user_id,
        created_at: model.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_empty_passcode_becomes_none() {
        let model = short_url::Model {
            id: 7,
            original_url: "https://example.com".into(),
            short_code: "abc".into(),
            passcode: Some(String::new()),
            clicks: -3,
            created_at: Utc::now(),
            expiry_date: None,
            user_id: 1,
            domain_id: 0,
            auto_delete: true,
        };
        let url = model_to_short_url(model);
        assert!(url.passcode.is_none());
        assert_eq!(url.clicks, 0);
        assert!(url.auto_delete);
    }

    #[test]
    fn test_unknown_role_and_status_are_restrictive() {
        let admin = model_to_admin(admin::Model {
            id: 1,
            username: "x".into(),
            password: "h".into(),
            quota: 0,
            role: "root".into(),
            status: "weird".into(),
            created_at: Utc::now(),
        });
        assert_eq!(admin.role, Role::User);
        assert_eq!(admin.status, AccountStatus::Disabled);
    }
}
