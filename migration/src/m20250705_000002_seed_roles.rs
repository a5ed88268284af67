use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 系统内置角色 (名称, 描述)
const ROLES: [(&str, &str); 3] = [
    ("ROLE_USER", "Regular user with basic access rights"),
    ("ROLE_MODERATOR", "User with moderation rights"),
    ("ROLE_ADMIN", "Administrator with full access rights"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert()
            .into_table(Roles::Table)
            .columns([Roles::Name, Roles::Description, Roles::CreatedBy, Roles::UpdatedBy])
            .to_owned();

        for (name, description) in ROLES {
            insert.values_panic([name.into(), description.into(), 0i64.into(), 0i64.into()]);
        }

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Roles::Table)
                    .and_where(Expr::col(Roles::Name).is_in(ROLES.map(|(name, _)| name)))
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Roles {
    Table,
    Name,
    Description,
    CreatedBy,
    UpdatedBy,
}
