use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 用户与域名的多对多关联，任一方删除时级联删除
        manager
            .create_table(
                Table::create()
                    .table(UserDomain::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserDomain::UserId).integer().not_null())
                    .col(ColumnDef::new(UserDomain::DomainId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(UserDomain::UserId)
                            .col(UserDomain::DomainId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_domains_user")
                            .from(UserDomain::Table, UserDomain::UserId)
                            .to(Admin::Table, Admin::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_domains_domain")
                            .from(UserDomain::Table, UserDomain::DomainId)
                            .to(Domain::Table, Domain::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserDomain::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserDomain {
    #[sea_orm(iden = "user_domains")]
    Table,
    UserId,
    DomainId,
}

#[derive(DeriveIden)]
enum Admin {
    #[sea_orm(iden = "admins")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Domain {
    #[sea_orm(iden = "domains")]
    Table,
    Id,
}
