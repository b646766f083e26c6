use std::sync::Arc;

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use super::{IdForm, session_user};
use crate::api::services::helpers::{flash_outcome, redirect_to, render_page};
use crate::api::session::Session;
use crate::config::SiteSettingsStore;
use crate::errors::Result;
use crate::services::DomainService;

const DOMAINS_PATH: &str = "/admin/domains";

#[derive(Debug, Deserialize)]
pub struct DomainForm {
    #[serde(default)]
    pub domain_name: String,
}

/// GET /admin/domains
pub async fn domains_page(
    session: Session,
    domains: web::Data<Arc<DomainService>>,
    settings: web::Data<Arc<SiteSettingsStore>>,
) -> Result<HttpResponse> {
    let list = domains.list().await?;
    let current = settings.get();
    let base_host = current.base_host();
    Ok(render_page(&session, &current, "Domains", |ctx| {
        crate::views::admin::domains::render(ctx, &base_host, &list)
    }))
}

/// POST /admin/domains/add
pub async fn add_domain(
    session: Session,
    form: web::Form<DomainForm>,
    domains: web::Data<Arc<DomainService>>,
) -> Result<HttpResponse> {
    let actor = session_user(&session)?;
    let result = domains.add(&actor, &form.domain_name).await;
    flash_outcome(
        &session,
        result,
        |domain| format!("Domain '{}' added", domain.domain_name),
        "Failed to add domain",
    );
    Ok(redirect_to(DOMAINS_PATH))
}

/// POST /admin/domains/delete
pub async fn delete_domain(
    session: Session,
    form: web::Form<IdForm>,
    domains: web::Data<Arc<DomainService>>,
) -> Result<HttpResponse> {
    let actor = session_user(&session)?;
    let result = domains.delete(&actor, form.id).await;
    flash_outcome(
        &session,
        result,
        |_| "Domain deleted".to_string(),
        "Failed to delete domain",
    );
    Ok(redirect_to(DOMAINS_PATH))
}
