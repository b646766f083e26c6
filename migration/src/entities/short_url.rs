use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "short_urls")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    pub original_url: String,
    pub short_code: String,
    pub passcode: Option<String>,
    pub clicks: i64,
    pub created_at: DateTimeUtc,
    pub expiry_date: Option<DateTimeUtc>,
    pub user_id: i32,
    pub domain_id: i32,
    pub auto_delete: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
