use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    // SQLite 只允许 INTEGER PRIMARY KEY 自增，本身即为 64 位
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string_len(150).not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Firstname).string_len(20).not_null())
                    .col(ColumnDef::new(Users::Lastname).string_len(20))
                    .col(
                        ColumnDef::new(Users::IsEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::IsAccountNonExpired)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::IsAccountNonLocked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::IsCredentialsNonExpired)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::AccountExpirationDate).timestamp())
                    .col(ColumnDef::new(Users::CredentialsExpirationDate).timestamp())
                    .col(
                        ColumnDef::new(Users::UserType)
                            .string_len(20)
                            .not_null()
                            .check(Expr::col(Users::UserType).is_in(["SERVICE_ACCOUNT", "USER_ACCOUNT"])),
                    )
                    .col(ColumnDef::new(Users::LastLogin).timestamp())
                    .col(ColumnDef::new(Users::CreatedBy).big_integer().not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Users::UpdatedBy).big_integer())
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Users::DeletedBy).big_integer())
                    .col(ColumnDef::new(Users::DeletedAt).timestamp())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Password,
    Email,
    Firstname,
    Lastname,
    IsEnabled,
    IsAccountNonExpired,
    IsAccountNonLocked,
    IsCredentialsNonExpired,
    IsDeleted,
    AccountExpirationDate,
    CredentialsExpirationDate,
    UserType,
    LastLogin,
    CreatedBy,
    CreatedAt,
    UpdatedBy,
    UpdatedAt,
    DeletedBy,
    DeletedAt,
}
