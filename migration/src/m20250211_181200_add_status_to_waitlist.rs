use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Rows inserted before this migration are treated as subscribed,
        // matching the filter used by the campaign runner.
        manager
            .alter_table(
                Table::alter()
                    .table(Waitlist::Table)
                    .add_column(
                        ColumnDef::new(Waitlist::Status)
                            .text()
                            .not_null()
                            .default("subscribed"),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Waitlist::Table)
                    .drop_column(Waitlist::Status)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Waitlist {
    Table,
    Status,
}
