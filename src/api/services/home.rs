use std::sync::Arc;

use actix_web::{HttpResponse, web};

use super::helpers::render_page;
use crate::api::session::Session;
use crate::config::SiteSettingsStore;

/// GET /
pub async fn index(session: Session, settings: web::Data<Arc<SiteSettingsStore>>) -> HttpResponse {
    let current = settings.get();
    render_page(&session, &current, "Home", crate::views::home::render)
}
