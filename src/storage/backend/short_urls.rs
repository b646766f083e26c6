//! short_urls 表的查询与写入

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, ExprTrait, PaginatorTrait,
    QueryFilter, QueryOrder, sea_query::Expr,
};
use tracing::debug;

use super::{SeaOrmStorage, map_write_err, model_to_short_url};
use crate::errors::{AppError, Result};
use crate::storage::models::{ShortUrl, ShortUrlDraft};

use migration::entities::short_url;

const DUPLICATE_CODE_MSG: &str = "This short code already exists on that domain";

impl SeaOrmStorage {
    pub async fn find_short_url(&self, code: &str, domain_id: i32) -> Result<Option<ShortUrl>> {
        let model = short_url::Entity::find()
            .filter(short_url::Column::ShortCode.eq(code))
            .filter(short_url::Column::DomainId.eq(domain_id))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_short_url))
    }

    pub async fn get_short_url(&self, id: i32) -> Result<Option<ShortUrl>> {
        let model = short_url::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_short_url))
    }

    /// (code, domain_id) 是否已被占用，编辑时排除自身
    pub async fn short_code_taken(
        &self,
        code: &str,
        domain_id: i32,
        exclude_id: Option<i32>,
    ) -> Result<bool> {
        let mut query = short_url::Entity::find()
            .filter(short_url::Column::ShortCode.eq(code))
            .filter(short_url::Column::DomainId.eq(domain_id));
        if let Some(id) = exclude_id {
            query = query.filter(short_url::Column::Id.ne(id));
        }
        Ok(query.count(&self.db).await? > 0)
    }

    pub async fn insert_short_url(&self, user_id: i32, draft: ShortUrlDraft) -> Result<ShortUrl> {
        let model = short_url::ActiveModel {
            original_url: Set(draft.original_url),
            short_code: Set(draft.short_code),
            passcode: Set(draft.passcode),
            clicks: Set(0),
            created_at: Set(Utc::now()),
            expiry_date: Set(draft.expiry_date),
            user_id: Set(user_id),
            domain_id: Set(draft.domain_id),
            auto_delete: Set(draft.auto_delete),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| map_write_err(e, DUPLICATE_CODE_MSG))?;

        debug!(
            "Short URL '{}' created on domain {}",
            model.short_code, model.domain_id
        );
        Ok(model_to_short_url(model))
    }

    /// 更新可编辑字段，保留 clicks、created_at 和 user_id
    pub async fn update_short_url(&self, id: i32, draft: ShortUrlDraft) -> Result<ShortUrl> {
        let model = short_url::ActiveModel {
            id: Set(id),
            original_url: Set(draft.original_url),
            short_code: Set(draft.short_code),
            passcode: Set(draft.passcode),
            expiry_date: Set(draft.expiry_date),
            domain_id: Set(draft.domain_id),
            auto_delete: Set(draft.auto_delete),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => AppError::not_found("Short URL not found"),
            other => map_write_err(other, DUPLICATE_CODE_MSG),
        })?;

        Ok(model_to_short_url(model))
    }

    /// 返回是否确实删除了记录
    pub async fn delete_short_url(&self, id: i32) -> Result<bool> {
        let res = short_url::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    /// 原子自增点击数
    pub async fn increment_clicks(&self, id: i32) -> Result<()> {
        short_url::Entity::update_many()
            .col_expr(
                short_url::Column::Clicks,
                Expr::col(short_url::Column::Clicks).add(Expr::val(1i64)),
            )
            .filter(short_url::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn count_short_urls_by_user(&self, user_id: i32) -> Result<u64> {
        Ok(short_url::Entity::find()
            .filter(short_url::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?)
    }

    pub async fn count_short_urls_by_domain(&self, domain_id: i32) -> Result<u64> {
        Ok(short_url::Entity::find()
            .filter(short_url::Column::DomainId.eq(domain_id))
            .count(&self.db)
            .await?)
    }

    /// 按创建时间倒序列出；`owner` 为 None 时列出全部
    pub async fn list_short_urls(&self, owner: Option<i32>) -> Result<Vec<ShortUrl>> {
        let mut query = short_url::Entity::find();
        if let Some(user_id) = owner {
            query = query.filter(short_url::Column::UserId.eq(user_id));
        }
        let models = query
            .order_by_desc(short_url::Column::CreatedAt)
            .order_by_desc(short_url::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_short_url).collect())
    }
}
