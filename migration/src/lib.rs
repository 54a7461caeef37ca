pub use sea_orm_migration::prelude::*;

mod m20250210_094500_create_waitlist_table;
mod m20250211_181200_add_status_to_waitlist;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250210_094500_create_waitlist_table::Migration),
            Box::new(m20250211_181200_add_status_to_waitlist::Migration),
        ]
    }
}
