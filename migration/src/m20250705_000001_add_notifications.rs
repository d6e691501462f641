use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum NotificationLog {
    Table,
    Id,
    UserId,
    NotificationType,
    SentAt,
    Opened,
    Clicked,
}

#[derive(DeriveIden)]
enum PendingInvoices {
    Table,
    Id,
    UserId,
    PackageId,
    Paid,
    Notified,
    SentAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NotificationLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NotificationLog::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(NotificationLog::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NotificationLog::NotificationType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NotificationLog::SentAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NotificationLog::Opened)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(NotificationLog::Clicked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notification_log_user_type")
                    .table(NotificationLog::Table)
                    .col(NotificationLog::UserId)
                    .col(NotificationLog::NotificationType)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PendingInvoices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PendingInvoices::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PendingInvoices::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingInvoices::PackageId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingInvoices::Paid)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PendingInvoices::Notified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PendingInvoices::SentAt)
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
                    .name("idx_pending_invoices_user")
                    .table(PendingInvoices::Table)
                    .col(PendingInvoices::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PendingInvoices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NotificationLog::Table).to_owned())
            .await?;
        Ok(())
    }
}
