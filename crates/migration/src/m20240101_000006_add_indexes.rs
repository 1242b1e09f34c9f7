use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Client: duplicate checks and search both hit (full_name, contact)
        manager
            .create_index(
                Index::create()
                    .name("idx_client_name_contact")
                    .table(Client::Table)
                    .col(Client::FullName)
                    .col(Client::Contact)
                    .to_owned(),
            )
            .await?;

        // Enrollment: one enrollment per client/program pair
        manager
            .create_index(
                Index::create()
                    .name("uniq_enrollment_client_program")
                    .table(Enrollment::Table)
                    .col(Enrollment::ClientId)
                    .col(Enrollment::ProgramId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Enrollment: status filter in queries and statistics
        manager
            .create_index(
                Index::create()
                    .name("idx_enrollment_status")
                    .table(Enrollment::Table)
                    .col(Enrollment::Status)
                    .to_owned(),
            )
            .await?;

        // Token: refresh lookup is by the token string itself
        manager
            .create_index(
                Index::create()
                    .name("idx_token_token")
                    .table(Token::Table)
                    .col(Token::Token)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_client_name_contact").table(Client::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("uniq_enrollment_client_program")
                    .table(Enrollment::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(Index::drop().name("idx_enrollment_status").table(Enrollment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_token_token").table(Token::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Client { Table, FullName, Contact }

#[derive(DeriveIden)]
enum Enrollment { Table, ClientId, ProgramId, Status }

#[derive(DeriveIden)]
enum Token { Table, Token }
