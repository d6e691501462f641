pub use sea_orm_migration::prelude::*;

mod m20250601_000001_initial;
mod m20250618_000001_add_engagement_columns;
mod m20250705_000001_add_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_initial::Migration),
            Box::new(m20250618_000001_add_engagement_columns::Migration),
            Box::new(m20250705_000001_add_notifications::Migration),
        ]
    }
}
