//! domains 表的查询与写入

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use super::{SeaOrmStorage, map_write_err, model_to_domain};
use crate::errors::Result;
use crate::storage::models::Domain;

use migration::entities::domain;

impl SeaOrmStorage {
    pub async fn list_domains(&self) -> Result<Vec<Domain>> {
        let models = domain::Entity::find()
            .order_by_asc(domain::Column::DomainName)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    pub async fn get_domain(&self, id: i32) -> Result<Option<Domain>> {
        let model = domain::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_domain))
    }

    pub async fn find_domain_by_name(&self, name: &str) -> Result<Option<Domain>> {
        let model = domain::Entity::find()
            .filter(domain::Column::DomainName.eq(name))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    pub async fn domains_by_ids(&self, ids: &[i32]) -> Result<Vec<Domain>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = domain::Entity::find()
            .filter(domain::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(domain::Column::DomainName)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    pub async fn insert_domain(&self, name: &str, added_by: Option<i32>) -> Result<Domain> {
        let model = domain::ActiveModel {
            domain_name: Set(name.to_string()),
            added_by_user_id: Set(added_by),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| map_write_err(e, "Domain already exists"))?;
        Ok(model_to_domain(model))
    }

    /// 域名分配由外键级联删除
    pub async fn delete_domain(&self, id: i32) -> Result<bool> {
        let res = domain::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}
