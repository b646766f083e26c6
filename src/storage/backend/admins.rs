//! admins 与 user_domains 表的查询与写入

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, ExprTrait,
    IsolationLevel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    sea_query::{Expr, InsertStatement, Query},
};
use tracing::{debug, info, warn};

use super::{SeaOrmStorage, map_write_err, model_to_admin};
use crate::errors::{AppError, Result};
use crate::storage::models::{AccountStatus, Admin, Role};

use migration::entities::{admin, domain, short_url, user_domain};

const DUPLICATE_USERNAME_MSG: &str = "Username already exists";

/// 新建账号所需字段（password 为已哈希的值）
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub username: String,
    pub password_hash: String,
    pub quota: i32,
    pub role: Role,
}

/// 编辑账号；`password_hash` 为 None 时保留原密码
#[derive(Debug, Clone)]
pub struct AdminUpdate {
    pub username: String,
    pub password_hash: Option<String>,
    pub quota: i32,
    pub role: Role,
}

impl SeaOrmStorage {
    pub async fn count_admins(&self) -> Result<u64> {
        Ok(admin::Entity::find().count(&self.db).await?)
    }

    pub async fn has_admin(&self) -> Result<bool> {
        Ok(self.count_admins().await? > 0)
    }

    pub async fn get_admin(&self, id: i32) -> Result<Option<Admin>> {
        let model = admin::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_admin))
    }

    pub async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>> {
        let model = admin::Entity::find()
            .filter(admin::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_admin))
    }

    pub async fn list_admins(&self) -> Result<Vec<Admin>> {
        let models = admin::Entity::find()
            .order_by_asc(admin::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_admin).collect())
    }

    /// id -> username，用于列表展示链接归属
    pub async fn admin_names(&self) -> Result<HashMap<i32, String>> {
        let rows: Vec<(i32, String)> = admin::Entity::find()
            .select_only()
            .column(admin::Column::Id)
            .column(admin::Column::Username)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn username_taken(&self, username: &str, exclude_id: Option<i32>) -> Result<bool> {
        let mut query = admin::Entity::find().filter(admin::Column::Username.eq(username));
        if let Some(id) = exclude_id {
            query = query.filter(admin::Column::Id.ne(id));
        }
        Ok(query.count(&self.db).await? > 0)
    }

    pub async fn create_admin(&self, new: NewAdmin) -> Result<Admin> {
        insert_admin(&self.db, new).await
    }

    /// 创建账号并分配域名（同一事务），分配失败时账号不会残留
    pub async fn create_admin_with_domains(
        &self,
        new: NewAdmin,
        domain_ids: &[i32],
    ) -> Result<Admin> {
        let txn = self.db.begin().await?;
        let created = insert_admin(&txn, new).await?;
        replace_domains(&txn, created.id, domain_ids).await?;
        txn.commit().await?;
        Ok(created)
    }

    /// 仅当 admins 表为空时创建超级管理员
    ///
    /// 使用 `INSERT ... SELECT ... WHERE NOT EXISTS` 单条语句完成。SQLite 的写入是串行的；
    /// PostgreSQL/MySQL 在 SERIALIZABLE 事务中执行，冲突被回滚的一方视为已有账号。
    /// 并发的首次登录最多只有一个能插入成功。返回 None 表示已有账号。
    pub async fn bootstrap_superadmin(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<Admin>> {
        let no_admins = Expr::exists(
            Query::select()
                .expr(Expr::val(1))
                .from(admin::Entity)
                .to_owned(),
        )
        .not();

        let values = Query::select()
            .exprs([
                Expr::val(username.to_string()),
                Expr::val(password_hash.to_string()),
                Expr::val(0),
                Expr::val(Role::SuperAdmin.to_string()),
                Expr::val(AccountStatus::Active.to_string()),
                Expr::val(Utc::now()),
            ])
            .and_where(no_admins)
            .to_owned();

        let mut insert = Query::insert();
        insert.into_table(admin::Entity).columns([
            admin::Column::Username,
            admin::Column::Password,
            admin::Column::Quota,
            admin::Column::Role,
            admin::Column::Status,
            admin::Column::CreatedAt,
        ]);
        insert
            .select_from(values)
            .map_err(|e| AppError::database_operation(format!("构建初始化语句失败: {}", e)))?;

        let inserted = if self.backend_name == "sqlite" {
            self.db.execute(&insert).await?.rows_affected()
        } else {
            match self.execute_serializable(&insert).await {
                Ok(rows) => rows,
                Err(e) => {
                    if !self.has_admin().await? {
                        return Err(e);
                    }
                    warn!("Concurrent superadmin bootstrap lost: {}", e);
                    0
                }
            }
        };
        if inserted == 0 {
            return Ok(None);
        }

        info!("Superadmin '{}' bootstrapped", username);
        self.find_admin_by_username(username).await
    }

    async fn execute_serializable(&self, insert: &InsertStatement) -> Result<u64> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?;
        let rows = txn.execute(insert).await?.rows_affected();
        txn.commit().await?;
        Ok(rows)
    }

    pub async fn update_admin(&self, id: i32, update: AdminUpdate) -> Result<Admin> {
        modify_admin(&self.db, id, update).await
    }

    /// 编辑账号并整体替换域名分配（同一事务）
    pub async fn update_admin_with_domains(
        &self,
        id: i32,
        update: AdminUpdate,
        domain_ids: &[i32],
    ) -> Result<Admin> {
        let txn = self.db.begin().await?;
        let updated = modify_admin(&txn, id, update).await?;
        replace_domains(&txn, id, domain_ids).await?;
        txn.commit().await?;
        Ok(updated)
    }

    pub async fn set_admin_password(&self, id: i32, password_hash: String) -> Result<()> {
        admin::ActiveModel {
            id: Set(id),
            password: Set(password_hash),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => AppError::not_found("User not found"),
            other => other.into(),
        })?;
        Ok(())
    }

    pub async fn set_admin_status(&self, id: i32, status: AccountStatus) -> Result<()> {
        let res = admin::Entity::update_many()
            .col_expr(admin::Column::Status, Expr::val(status.to_string()))
            .filter(admin::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::not_found("User not found"));
        }
        Ok(())
    }

    /// 删除账号及其名下所有短链接（同一事务），域名分配级联删除
    pub async fn delete_admin_with_urls(&self, id: i32) -> Result<bool> {
        let txn = self.db.begin().await?;

        short_url::Entity::delete_many()
            .filter(short_url::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        user_domain::Entity::delete_many()
            .filter(user_domain::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        let res = admin::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(res.rows_affected > 0)
    }

    /// 用户被分配的域名 id
    pub async fn domain_ids_for_user(&self, user_id: i32) -> Result<Vec<i32>> {
        let ids: Vec<i32> = user_domain::Entity::find()
            .select_only()
            .column(user_domain::Column::DomainId)
            .filter(user_domain::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(ids)
    }

    /// 所有用户的域名分配（user_id -> domain ids），用于用户管理页
    pub async fn all_domain_assignments(&self) -> Result<HashMap<i32, Vec<i32>>> {
        let rows = user_domain::Entity::find().all(&self.db).await?;
        let mut map: HashMap<i32, Vec<i32>> = HashMap::new();
        for row in rows {
            map.entry(row.user_id).or_default().push(row.domain_id);
        }
        Ok(map)
    }

    /// 整体替换用户的域名分配（先删后插，同一事务）
    ///
    /// 不存在的域名 id 被忽略。
    pub async fn assign_domains(&self, user_id: i32, domain_ids: &[i32]) -> Result<()> {
        let txn = self.db.begin().await?;
        replace_domains(&txn, user_id, domain_ids).await?;
        txn.commit().await?;
        Ok(())
    }
}

async fn insert_admin<C: ConnectionTrait>(conn: &C, new: NewAdmin) -> Result<Admin> {
    let model = admin::ActiveModel {
        username: Set(new.username),
        password: Set(new.password_hash),
        quota: Set(new.quota),
        role: Set(new.role.to_string()),
        status: Set(AccountStatus::Active.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(|e| map_write_err(e, DUPLICATE_USERNAME_MSG))?;

    debug!("Account '{}' created (id {})", model.username, model.id);
    Ok(model_to_admin(model))
}

async fn modify_admin<C: ConnectionTrait>(conn: &C, id: i32, update: AdminUpdate) -> Result<Admin> {
    let mut model = admin::ActiveModel {
        id: Set(id),
        username: Set(update.username),
        quota: Set(update.quota),
        role: Set(update.role.to_string()),
        ..Default::default()
    };
    if let Some(hash) = update.password_hash {
        model.password = Set(hash);
    }

    let model = model.update(conn).await.map_err(|e| match e {
        sea_orm::DbErr::RecordNotUpdated => AppError::not_found("User not found"),
        other => map_write_err(other, DUPLICATE_USERNAME_MSG),
    })?;
    Ok(model_to_admin(model))
}

/// 先删后插；不存在的域名 id 被忽略
async fn replace_domains<C: ConnectionTrait>(conn: &C, user_id: i32, domain_ids: &[i32]) -> Result<()> {
    user_domain::Entity::delete_many()
        .filter(user_domain::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;

    let existing: Vec<i32> = if domain_ids.is_empty() {
        Vec::new()
    } else {
        domain::Entity::find()
            .select_only()
            .column(domain::Column::Id)
            .filter(domain::Column::Id.is_in(domain_ids.iter().copied()))
            .into_tuple()
            .all(conn)
            .await?
    };

    if !existing.is_empty() {
        let rows = existing.iter().map(|domain_id| user_domain::ActiveModel {
            user_id: Set(user_id),
            domain_id: Set(*domain_id),
        });
        user_domain::Entity::insert_many(rows).exec(conn).await?;
    }

    debug!(
        "Assigned {} domain(s) to user {}",
        existing.len(),
        user_id
    );
    Ok(())
}
