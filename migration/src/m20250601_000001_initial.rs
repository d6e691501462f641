use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    TelegramId,
    Username,
    Credits,
    TotalSpent,
    ReferredBy,
    ReferralCredited,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PromoCodes {
    Table,
    Code,
    Credits,
    MaxUses,
    TimesUsed,
    ExpiresAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PromoRedemptions {
    Table,
    UserId,
    Code,
    RedeemedAt,
}

#[derive(DeriveIden)]
enum Generations {
    Table,
    Id,
    UserId,
    EffectId,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Purchases {
    Table,
    Id,
    UserId,
    Credits,
    PriceMinor,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::TelegramId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Username).string().null())
                    .col(
                        ColumnDef::new(Users::Credits)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::TotalSpent)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Users::ReferredBy).big_integer().null())
                    .col(
                        ColumnDef::new(Users::ReferralCredited)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PromoCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PromoCodes::Code)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PromoCodes::Credits).big_integer().not_null())
                    .col(ColumnDef::new(PromoCodes::MaxUses).big_integer().null())
                    .col(
                        ColumnDef::new(PromoCodes::TimesUsed)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PromoCodes::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PromoCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Composite primary key doubles as the one-redemption-per-user guard.
        manager
            .create_table(
                Table::create()
                    .table(PromoRedemptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PromoRedemptions::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PromoRedemptions::Code).string().not_null())
                    .col(
                        ColumnDef::new(PromoRedemptions::RedeemedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(PromoRedemptions::UserId)
                            .col(PromoRedemptions::Code),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Generations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Generations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Generations::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Generations::EffectId).string().not_null())
                    .col(ColumnDef::new(Generations::Status).string().not_null())
                    .col(
                        ColumnDef::new(Generations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_generations_user")
                    .table(Generations::Table)
                    .col(Generations::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Purchases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Purchases::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Purchases::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Purchases::Credits).big_integer().not_null())
                    .col(
                        ColumnDef::new(Purchases::PriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Purchases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_purchases_user")
                    .table(Purchases::Table)
                    .col(Purchases::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Purchases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Generations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PromoRedemptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PromoCodes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
