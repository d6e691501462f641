use crate::entities::{
    generation_entity as generations, pending_invoice_entity as invoices,
    purchase_entity as purchases, user_entity as users, GenerationStatus,
};
use crate::error::{AppError, AppResult};
use crate::models::SyncAccountRequest;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, SqlErr,
};

#[derive(Clone)]
pub struct AccountService {
    pool: DatabaseConnection,
    starting_balance: i64,
}

impl AccountService {
    pub fn new(pool: DatabaseConnection, starting_balance: i64) -> Self {
        Self {
            pool,
            starting_balance,
        }
    }

    pub async fn get(&self, telegram_id: i64) -> AppResult<users::Model> {
        users::Entity::find_by_id(telegram_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))
    }

    /// Get the account, creating it with the starting balance on first
    /// contact. Referrer and acquisition source are only honored at
    /// creation; a changed display name is picked up on revisit.
    ///
    /// Returns (account, is_new).
    pub async fn get_or_create(
        &self,
        req: &SyncAccountRequest,
    ) -> AppResult<(users::Model, bool)> {
        if let Some(existing) = users::Entity::find_by_id(req.telegram_id)
            .one(&self.pool)
            .await?
        {
            if req.username.is_some() && existing.username != req.username {
                let mut am: users::ActiveModel = existing.into();
                am.username = Set(req.username.clone());
                let updated = am.update(&self.pool).await?;
                return Ok((updated, false));
            }
            return Ok((existing, false));
        }

        let now = Utc::now();
        let fresh = users::ActiveModel {
            telegram_id: Set(req.telegram_id),
            username: Set(req.username.clone()),
            credits: Set(self.starting_balance),
            total_spent: Set(0),
            // Self-referrals make no sense; drop them here.
            referred_by: Set(req.referred_by.filter(|r| *r != req.telegram_id)),
            referral_credited: Set(false),
            acquisition_source: Set(req.source.clone()),
            created_at: Set(now),
            last_active_at: Set(Some(now)),
        };

        match fresh.insert(&self.pool).await {
            Ok(model) => {
                log::info!(
                    "Created account {} with {} starting credits",
                    model.telegram_id,
                    self.starting_balance
                );
                Ok((model, true))
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                // Lost a race with another /start for the same user.
                let model = self.get(req.telegram_id).await?;
                Ok((model, false))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Advance the activity timestamp. Only ever moves forward.
    pub async fn touch_last_active(&self, telegram_id: i64) -> AppResult<()> {
        users::Entity::update_many()
            .col_expr(users::Column::LastActiveAt, Expr::value(Utc::now()))
            .filter(users::Column::TelegramId.eq(telegram_id))
            .exec(&self.pool)
            .await?;
        Ok(())
    }

    /// One row per attempt, success or failure.
    pub async fn record_generation(
        &self,
        telegram_id: i64,
        effect_id: &str,
        status: GenerationStatus,
    ) -> AppResult<()> {
        generations::ActiveModel {
            user_id: Set(telegram_id),
            effect_id: Set(effect_id.to_string()),
            status: Set(status),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn generation_count(&self, telegram_id: i64) -> AppResult<u64> {
        Ok(generations::Entity::find()
            .filter(generations::Column::UserId.eq(telegram_id))
            .count(&self.pool)
            .await?)
    }

    pub async fn record_invoice(
        &self,
        telegram_id: i64,
        package_id: &str,
    ) -> AppResult<invoices::Model> {
        let model = invoices::ActiveModel {
            user_id: Set(telegram_id),
            package_id: Set(package_id.to_string()),
            paid: Set(false),
            notified: Set(false),
            sent_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(model)
    }

    /// Flip any open invoice for this (user, package) to paid.
    pub async fn mark_invoice_paid(&self, telegram_id: i64, package_id: &str) -> AppResult<()> {
        invoices::Entity::update_many()
            .col_expr(invoices::Column::Paid, Expr::value(true))
            .filter(invoices::Column::UserId.eq(telegram_id))
            .filter(invoices::Column::PackageId.eq(package_id))
            .filter(invoices::Column::Paid.eq(false))
            .exec(&self.pool)
            .await?;
        Ok(())
    }

    /// Written only after the payment provider confirmed the charge.
    pub async fn record_purchase(
        &self,
        telegram_id: i64,
        credits: i64,
        price_minor: i64,
    ) -> AppResult<()> {
        purchases::ActiveModel {
            user_id: Set(telegram_id),
            credits: Set(credits),
            price_minor: Set(price_minor),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn purchase_count(&self, telegram_id: i64) -> AppResult<u64> {
        Ok(purchases::Entity::find()
            .filter(purchases::Column::UserId.eq(telegram_id))
            .count(&self.pool)
            .await?)
    }
}
