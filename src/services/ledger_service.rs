use crate::config::CreditsConfig;
use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    TransactionTrait,
};

/// Owns every balance mutation. All writes are single conditional statements
/// so the store's own atomicity is the only correctness mechanism; nothing
/// here reads a balance and then writes it back in a second round trip.
#[derive(Clone)]
pub struct LedgerService {
    pool: DatabaseConnection,
    credits: CreditsConfig,
}

impl LedgerService {
    pub fn new(pool: DatabaseConnection, credits: CreditsConfig) -> Self {
        Self { pool, credits }
    }

    pub fn winback_bonus(&self) -> i64 {
        self.credits.winback_bonus
    }

    /// Add credits unconditionally. Returns the new balance.
    pub async fn grant(&self, telegram_id: i64, amount: i64) -> AppResult<i64> {
        self.grant_in(&self.pool, telegram_id, amount).await?;
        self.balance(telegram_id).await
    }

    /// Grant on an arbitrary connection so callers (promo redemption,
    /// referral crediting) can fold the grant into their own transaction.
    pub(crate) async fn grant_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        telegram_id: i64,
        amount: i64,
    ) -> AppResult<()> {
        let res = users::Entity::update_many()
            .col_expr(
                users::Column::Credits,
                Expr::col(users::Column::Credits).add(amount),
            )
            .filter(users::Column::TelegramId.eq(telegram_id))
            .exec(conn)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Account not found".to_string()));
        }
        Ok(())
    }

    /// Spend credits. The balance check lives in the UPDATE's predicate, so
    /// two concurrent deducts can never both win the last credit.
    pub async fn deduct(&self, telegram_id: i64, amount: i64) -> AppResult<i64> {
        if amount <= 0 {
            return Err(AppError::ValidationError(
                "Deduct amount must be positive".to_string(),
            ));
        }

        let res = users::Entity::update_many()
            .col_expr(
                users::Column::Credits,
                Expr::col(users::Column::Credits).sub(amount),
            )
            .col_expr(
                users::Column::TotalSpent,
                Expr::col(users::Column::TotalSpent).add(amount),
            )
            .filter(users::Column::TelegramId.eq(telegram_id))
            .filter(users::Column::Credits.gte(amount))
            .exec(&self.pool)
            .await?;

        if res.rows_affected == 0 {
            // Distinguish a missing account from the expected business
            // outcome of not having enough credits.
            return match users::Entity::find_by_id(telegram_id).one(&self.pool).await? {
                Some(_) => Err(AppError::InsufficientBalance),
                None => Err(AppError::NotFound("Account not found".to_string())),
            };
        }

        self.balance(telegram_id).await
    }

    /// Compensating action for a deduct whose external call failed. Restores
    /// both the balance and the lifetime-spent counter.
    pub async fn refund(&self, telegram_id: i64, amount: i64) -> AppResult<i64> {
        if amount <= 0 {
            return Err(AppError::ValidationError(
                "Refund amount must be positive".to_string(),
            ));
        }

        let res = users::Entity::update_many()
            .col_expr(
                users::Column::Credits,
                Expr::col(users::Column::Credits).add(amount),
            )
            .col_expr(
                users::Column::TotalSpent,
                Expr::col(users::Column::TotalSpent).sub(amount),
            )
            .filter(users::Column::TelegramId.eq(telegram_id))
            .exec(&self.pool)
            .await?;

        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Account not found".to_string()));
        }

        self.balance(telegram_id).await
    }

    pub async fn balance(&self, telegram_id: i64) -> AppResult<i64> {
        users::Entity::find_by_id(telegram_id)
            .one(&self.pool)
            .await?
            .map(|u| u.credits)
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))
    }

    /// Referral bonus keyed off the referred user's first successful
    /// generation. Applies to the referrer's first
    /// `referral_payment_tier_after` referrals; later referrals are rewarded
    /// on first payment instead.
    ///
    /// Returns the referrer's id when a bonus was paid. Safe to call on
    /// every generation: the referral_credited flag is the exactly-once
    /// gate, flipped in the same transaction as the grant.
    pub async fn credit_referral_on_first_generation(
        &self,
        telegram_id: i64,
    ) -> AppResult<Option<i64>> {
        let Some((referrer_id, rank)) = self.referral_standing(telegram_id).await? else {
            return Ok(None);
        };
        if rank > self.credits.referral_payment_tier_after {
            return Ok(None);
        }
        self.flip_and_grant(telegram_id, referrer_id).await
    }

    /// Referral bonus keyed off the referred user's first completed payment,
    /// for referrals past the generation tier.
    pub async fn credit_referral_on_first_payment(
        &self,
        telegram_id: i64,
    ) -> AppResult<Option<i64>> {
        let Some((referrer_id, rank)) = self.referral_standing(telegram_id).await? else {
            return Ok(None);
        };
        if rank <= self.credits.referral_payment_tier_after {
            return Ok(None);
        }
        self.flip_and_grant(telegram_id, referrer_id).await
    }

    /// Referrer id and the referred user's position (1-based, by signup
    /// order) among that referrer's referrals. None when no bonus can be
    /// owed: no referrer, or already credited.
    async fn referral_standing(&self, telegram_id: i64) -> AppResult<Option<(i64, i64)>> {
        let Some(user) = users::Entity::find_by_id(telegram_id).one(&self.pool).await? else {
            return Ok(None);
        };
        let Some(referrer_id) = user.referred_by else {
            return Ok(None);
        };
        if user.referral_credited {
            return Ok(None);
        }

        let rank = users::Entity::find()
            .filter(users::Column::ReferredBy.eq(referrer_id))
            .filter(users::Column::CreatedAt.lte(user.created_at))
            .count(&self.pool)
            .await? as i64;

        Ok(Some((referrer_id, rank)))
    }

    /// Flip the referral_credited flag and pay the referrer in one
    /// transaction. The guarded flip (false -> true) makes a concurrent or
    /// retried invocation a no-op with no second bonus.
    async fn flip_and_grant(&self, telegram_id: i64, referrer_id: i64) -> AppResult<Option<i64>> {
        let txn = self.pool.begin().await?;

        let res = users::Entity::update_many()
            .col_expr(users::Column::ReferralCredited, Expr::value(true))
            .filter(users::Column::TelegramId.eq(telegram_id))
            .filter(users::Column::ReferralCredited.eq(false))
            .exec(&txn)
            .await?;
        if res.rows_affected == 0 {
            // Someone else already decided; nothing to pay.
            txn.commit().await?;
            return Ok(None);
        }

        let res = users::Entity::update_many()
            .col_expr(
                users::Column::Credits,
                Expr::col(users::Column::Credits).add(self.credits.referral_bonus),
            )
            .filter(users::Column::TelegramId.eq(referrer_id))
            .exec(&txn)
            .await?;
        if res.rows_affected == 0 {
            log::warn!("Referrer {referrer_id} no longer exists, bonus skipped");
        }

        txn.commit().await?;
        log::info!(
            "Credited referrer {referrer_id} with {} credits for user {telegram_id}",
            self.credits.referral_bonus
        );
        Ok(Some(referrer_id))
    }
}
