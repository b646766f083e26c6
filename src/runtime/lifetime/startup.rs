use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::{SiteSettingsStore, get_config, init_site_settings};
use crate::storage::{SeaOrmStorage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub settings: Arc<SiteSettingsStore>,
}

/// 准备服务器启动的上下文：连接数据库并迁移、加载站点设置
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let config = get_config();

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let settings = init_site_settings(&config.settings.path);
    let current = settings.get();
    info!(
        "Site settings loaded from {} (site '{}', base URL {}, captcha {})",
        settings.path().display(),
        current.site_name,
        current.base_url,
        if current.captcha.enabled { "on" } else { "off" }
    );

    if !storage.has_admin().await? {
        info!("No accounts yet: the first login will create the superadmin");
    }

    debug!("Pre-startup completed in {:?}", start_time.elapsed());
    Ok(StartupContext { storage, settings })
}
