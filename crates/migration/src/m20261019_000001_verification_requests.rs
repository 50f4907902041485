use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VerificationRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VerificationRequests::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VerificationRequests::FirstName)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationRequests::LastName)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationRequests::InstitutionName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationRequests::InstitutionAddress)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationRequests::Role)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationRequests::Email)
                            .string_len(254)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationRequests::IsVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(VerificationRequests::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // The review queue filters on this column.
        manager
            .create_index(
                Index::create()
                    .name("idx_verification_requests_is_verified")
                    .table(VerificationRequests::Table)
                    .col(VerificationRequests::IsVerified)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let _ = manager
            .drop_index(
                Index::drop()
                    .name("idx_verification_requests_is_verified")
                    .to_owned(),
            )
            .await;

        manager
            .drop_table(Table::drop().table(VerificationRequests::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VerificationRequests {
    Table,
    Id,
    FirstName,
    LastName,
    InstitutionName,
    InstitutionAddress,
    Role,
    Email,
    IsVerified,
    CreatedAt,
}
