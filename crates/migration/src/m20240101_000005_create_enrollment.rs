//! Create `enrollment` join table between `client` and `health_program`.
//! The (client_id, program_id) uniqueness is enforced by an index migration.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Enrollment::Table)
                    .if_not_exists()
                    .col(uuid(Enrollment::Id).primary_key())
                    .col(uuid(Enrollment::ClientId).not_null())
                    .col(uuid(Enrollment::ProgramId).not_null())
                    .col(string_len(Enrollment::Status, 32).not_null())
                    .col(ColumnDef::new(Enrollment::Notes).text().null())
                    .col(timestamp_with_time_zone(Enrollment::EnrolledAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollment_client")
                            .from(Enrollment::Table, Enrollment::ClientId)
                            .to(Client::Table, Client::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollment_program")
                            .from(Enrollment::Table, Enrollment::ProgramId)
                            .to(HealthProgram::Table, HealthProgram::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Enrollment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Enrollment { Table, Id, ClientId, ProgramId, Status, Notes, EnrolledAt }

#[derive(DeriveIden)]
enum Client { Table, Id }

#[derive(DeriveIden)]
enum HealthProgram { Table, Id }
