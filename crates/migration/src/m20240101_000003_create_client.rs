//! Create `client` table with FK to the registering `user`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Client::Table)
                    .if_not_exists()
                    .col(uuid(Client::Id).primary_key())
                    .col(string_len(Client::FullName, 255).not_null())
                    .col(date(Client::Dob).not_null())
                    .col(string_len(Client::Gender, 32).not_null())
                    .col(string_len(Client::Contact, 64).not_null())
                    // Explicitly define nullable notes to avoid conflicting NULL/NOT NULL
                    .col(ColumnDef::new(Client::Notes).text().null())
                    .col(uuid(Client::UserId).not_null())
                    .col(timestamp_with_time_zone(Client::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Client::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_user")
                            .from(Client::Table, Client::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Client::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Client { Table, Id, FullName, Dob, Gender, Contact, Notes, UserId, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
