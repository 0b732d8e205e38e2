use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create accounts table; the distribution partner is a self-FK.
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(pk_auto(Accounts::Id))
                    .col(string_null(Accounts::Email))
                    .col(string_null(Accounts::Name))
                    .col(string_null(Accounts::Surname))
                    .col(boolean(Accounts::IsCorporate).default(false))
                    .col(string_null(Accounts::CorporateName))
                    .col(integer_null(Accounts::DistributionPartnerAccountId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_account_distribution_partner")
                            .from(Accounts::Table, Accounts::DistributionPartnerAccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create opportunities table
        manager
            .create_table(
                Table::create()
                    .table(Opportunities::Table)
                    .if_not_exists()
                    .col(pk_auto(Opportunities::Id))
                    .col(string(Opportunities::TextId).unique_key())
                    .col(string(Opportunities::Title))
                    .col(string_null(Opportunities::TitleEn))
                    .col(string_null(Opportunities::Subtitle))
                    .col(string(Opportunities::Currency))
                    .col(decimal(Opportunities::FundraisingTarget))
                    .to_owned(),
            )
            .await?;

        // Create payments table
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(pk_auto(Payments::Id))
                    .col(integer(Payments::AccountId))
                    .col(integer(Payments::OpportunityId))
                    .col(decimal(Payments::Amount))
                    .col(string(Payments::Currency))
                    .col(date_time(Payments::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_account")
                            .from(Payments::Table, Payments::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_opportunity")
                            .from(Payments::Table, Payments::OpportunityId)
                            .to(Opportunities::Table, Opportunities::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Opportunities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Email,
    Name,
    Surname,
    IsCorporate,
    CorporateName,
    DistributionPartnerAccountId,
}

#[derive(DeriveIden)]
enum Opportunities {
    Table,
    Id,
    TextId,
    Title,
    TitleEn,
    Subtitle,
    Currency,
    FundraisingTarget,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    AccountId,
    OpportunityId,
    Amount,
    Currency,
    CreatedAt,
}
