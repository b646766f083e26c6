use std::sync::Arc;

use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::SeaOrmStorage;
pub use backend::admins::{AdminUpdate, NewAdmin};
pub use models::{AccountStatus, Admin, BASE_DOMAIN_ID, Domain, Role, ShortUrl, ShortUrlDraft};

pub struct StorageFactory;

impl StorageFactory {
    /// 按全局配置中的 database_url 创建存储并执行迁移
    pub async fn create() -> Result<Arc<SeaOrmStorage>> {
        let config = crate::config::get_config();
        let storage = SeaOrmStorage::connect(&config.database.database_url).await?;
        Ok(Arc::new(storage))
    }
}
