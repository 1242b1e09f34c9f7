//! Create `health_program` table. Program names are globally unique.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HealthProgram::Table)
                    .if_not_exists()
                    .col(uuid(HealthProgram::Id).primary_key())
                    .col(string_len(HealthProgram::Name, 255).unique_key().not_null())
                    .col(ColumnDef::new(HealthProgram::Description).text().null())
                    .col(timestamp_with_time_zone(HealthProgram::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(HealthProgram::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(HealthProgram::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum HealthProgram { Table, Id, Name, Description, CreatedAt, UpdatedAt }
