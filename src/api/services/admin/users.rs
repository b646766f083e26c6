use std::sync::Arc;

use actix_web::{HttpResponse, web};

use super::{IdForm, session_user};
use crate::api::services::helpers::{flash_outcome, redirect_to, render_page};
use crate::api::session::Session;
use crate::config::SiteSettingsStore;
use crate::errors::{AppError, Result};
use crate::services::{UserInput, UserService};
use crate::storage::AccountStatus;

const USERS_PATH: &str = "/admin/users";

/// 账号表单包含重复的 `domains` 字段，web::Form 无法表达，手动解析
#[derive(Debug, Default)]
struct UserForm {
    id: Option<String>,
    input: UserInput,
}

impl UserForm {
    fn parse(body: &[u8]) -> Self {
        let mut form = UserForm::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            match key.as_ref() {
                "id" => form.id = Some(value.into_owned()),
                "username" => form.input.username = value.into_owned(),
                "password" => form.input.password = Some(value.into_owned()),
                "quota" => form.input.quota = Some(value.into_owned()),
                "role" => form.input.role = Some(value.into_owned()),
                "domains" => {
                    if let Ok(id) = value.trim().parse::<i32>()
                        && !form.input.domain_ids.contains(&id)
                    {
                        form.input.domain_ids.push(id);
                    }
                }
                _ => {}
            }
        }
        form
    }

    fn id(&self) -> Result<i32> {
        self.id
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| AppError::validation("Missing user id"))
    }
}

/// GET /admin/users
pub async fn users_page(
    session: Session,
    users: web::Data<Arc<UserService>>,
    settings: web::Data<Arc<SiteSettingsStore>>,
) -> Result<HttpResponse> {
    let data = users.overview().await?;
    Ok(render_page(&session, &settings.get(), "Users", |ctx| {
        crate::views::admin::users::render(ctx, &data)
    }))
}

/// POST /admin/users/add
pub async fn add_user(
    session: Session,
    body: web::Bytes,
    users: web::Data<Arc<UserService>>,
) -> Result<HttpResponse> {
    let actor = session_user(&session)?;
    let form = UserForm::parse(&body);
    let result = users.add(&actor, form.input).await;
    flash_outcome(
        &session,
        result,
        |user| format!("User '{}' created", user.username),
        "Failed to create user",
    );
    Ok(redirect_to(USERS_PATH))
}

/// POST /admin/users/edit
pub async fn edit_user(
    session: Session,
    body: web::Bytes,
    users: web::Data<Arc<UserService>>,
) -> Result<HttpResponse> {
    let actor = session_user(&session)?;
    let form = UserForm::parse(&body);
    let result = match form.id() {
        Ok(id) => users.edit(&actor, id, form.input).await,
        Err(e) => Err(e),
    };
    flash_outcome(
        &session,
        result,
        |user| format!("User '{}' updated", user.username),
        "Failed to update user",
    );
    Ok(redirect_to(USERS_PATH))
}

/// POST /admin/users/delete
pub async fn delete_user(
    session: Session,
    form: web::Form<IdForm>,
    users: web::Data<Arc<UserService>>,
) -> Result<HttpResponse> {
    let actor = session_user(&session)?;
    let result = users.delete(&actor, form.id).await;
    flash_outcome(
        &session,
        result,
        |_| "User and their short URLs deleted".to_string(),
        "Failed to delete user",
    );
    Ok(redirect_to(USERS_PATH))
}

/// POST /admin/users/toggle-status
pub async fn toggle_status(
    session: Session,
    form: web::Form<IdForm>,
    users: web::Data<Arc<UserService>>,
) -> Result<HttpResponse> {
    let actor = session_user(&session)?;
    let result = users.toggle_status(&actor, form.id).await;
    flash_outcome(
        &session,
        result,
        |status| match status {
            AccountStatus::Active => "User enabled".to_string(),
            AccountStatus::Disabled => "User disabled".to_string(),
        },
        "Failed to change user status",
    );
    Ok(redirect_to(USERS_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repeated_domains() {
        let form = UserForm::parse(
            b"id=5&username=bob&password=&quota=10&role=user&domains=2&domains=3&domains=2&domains=x",
        );
        assert_eq!(form.id().unwrap(), 5);
        assert_eq!(form.input.username, "bob");
        assert_eq!(form.input.password.as_deref(), Some(""));
        assert_eq!(form.input.quota.as_deref(), Some("10"));
        assert_eq!(form.input.domain_ids, vec![2, 3]);
    }

    #[test]
    fn test_parse_without_domains() {
        let form = UserForm::parse(b"username=alice+smith&password=p%40ss");
        assert_eq!(form.input.username, "alice smith");
        assert_eq!(form.input.password.as_deref(), Some("p@ss"));
        assert!(form.input.domain_ids.is_empty());
        assert!(form.id().is_err());
    }
}
