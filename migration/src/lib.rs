pub use sea_orm_migration::prelude::*;

mod m20250702_000001_create_users_table;
mod m20250702_000002_create_roles_table;
mod m20250702_000003_create_user_roles_table;
mod m20250703_000001_create_refresh_tokens_table;
mod m20250705_000001_create_notes_table;
mod m20250705_000002_seed_roles;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250702_000001_create_users_table::Migration),
            Box::new(m20250702_000002_create_roles_table::Migration),
            Box::new(m20250702_000003_create_user_roles_table::Migration),
            Box::new(m20250703_000001_create_refresh_tokens_table::Migration),
            Box::new(m20250705_000001_create_notes_table::Migration),
            Box::new(m20250705_000002_seed_roles::Migration),
        ]
    }
}
