use crate::entities::{promo_code_entity as promo_codes, promo_redemption_entity as redemptions};
use crate::error::{AppError, AppResult};
use crate::services::LedgerService;
use crate::utils::{generate_promo_code, normalize_promo_code};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
    SqlErr, TransactionTrait,
};

#[derive(Clone)]
pub struct PromoService {
    pool: DatabaseConnection,
    ledger: LedgerService,
}

impl PromoService {
    pub fn new(pool: DatabaseConnection, ledger: LedgerService) -> Self {
        Self { pool, ledger }
    }

    /// Mint a new code, retrying generation until the store confirms no
    /// collision.
    pub async fn create_code(
        &self,
        credits: i64,
        max_uses: Option<i64>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<promo_codes::Model> {
        if credits <= 0 {
            return Err(AppError::ValidationError(
                "Promo credit value must be positive".to_string(),
            ));
        }
        if let Some(max) = max_uses {
            if max <= 0 {
                return Err(AppError::ValidationError(
                    "max_uses must be positive when set".to_string(),
                ));
            }
        }

        let mut code = generate_promo_code();
        while promo_codes::Entity::find_by_id(code.clone())
            .one(&self.pool)
            .await?
            .is_some()
        {
            code = generate_promo_code();
        }

        let model = promo_codes::ActiveModel {
            code: Set(code),
            credits: Set(credits),
            max_uses: Set(max_uses),
            times_used: Set(0),
            expires_at: Set(expires_at),
            created_at: Set(Utc::now()),
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Created promo code {} worth {} credits (max_uses: {:?})",
            model.code,
            model.credits,
            model.max_uses
        );
        Ok(model)
    }

    pub async fn get_code(&self, code: &str) -> AppResult<Option<promo_codes::Model>> {
        let code = normalize_promo_code(code);
        Ok(promo_codes::Entity::find_by_id(code).one(&self.pool).await?)
    }

    /// Redeem a code for the calling account. Check order is deliberate: a
    /// user retrying a code they already used gets the stable
    /// "already redeemed" answer, not whatever the code's expiry state
    /// happens to be by then.
    ///
    /// Returns (credits granted, new balance).
    pub async fn redeem(&self, telegram_id: i64, raw_code: &str) -> AppResult<(i64, i64)> {
        let code = normalize_promo_code(raw_code);

        let txn = self.pool.begin().await?;

        let promo = promo_codes::Entity::find_by_id(code.clone())
            .one(&txn)
            .await?
            .ok_or(AppError::PromoCodeNotFound)?;

        let already = redemptions::Entity::find_by_id((telegram_id, code.clone()))
            .one(&txn)
            .await?;
        if already.is_some() {
            return Err(AppError::PromoAlreadyRedeemed);
        }

        if let Some(expires_at) = promo.expires_at {
            if Utc::now() > expires_at {
                return Err(AppError::PromoCodeExpired);
            }
        }
        if let Some(max_uses) = promo.max_uses {
            if promo.times_used >= max_uses {
                return Err(AppError::PromoCodeExhausted);
            }
        }

        // The composite primary key catches a concurrent duplicate the
        // pre-check above could not see.
        let redemption = redemptions::ActiveModel {
            user_id: Set(telegram_id),
            code: Set(code.clone()),
            redeemed_at: Set(Utc::now()),
        };
        match redemption.insert(&txn).await {
            Ok(_) => {}
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Err(AppError::PromoAlreadyRedeemed);
            }
            Err(e) => return Err(e.into()),
        }

        // The counter increment re-checks the usage cap at write time; with
        // max_uses = 1 and two near-simultaneous redeemers there is exactly
        // one winner.
        let res = promo_codes::Entity::update_many()
            .col_expr(
                promo_codes::Column::TimesUsed,
                Expr::col(promo_codes::Column::TimesUsed).add(1),
            )
            .filter(promo_codes::Column::Code.eq(code.clone()))
            .filter(
                Condition::any()
                    .add(promo_codes::Column::MaxUses.is_null())
                    .add(
                        Expr::col(promo_codes::Column::TimesUsed)
                            .lt(Expr::col(promo_codes::Column::MaxUses)),
                    ),
            )
            .exec(&txn)
            .await?;
        if res.rows_affected == 0 {
            // Dropping the transaction rolls the redemption row back.
            return Err(AppError::PromoCodeExhausted);
        }

        self.ledger.grant_in(&txn, telegram_id, promo.credits).await?;

        txn.commit().await?;
        log::info!(
            "User {telegram_id} redeemed {} for {} credits",
            promo.code,
            promo.credits
        );

        let balance = self.ledger.balance(telegram_id).await?;
        Ok((promo.credits, balance))
    }
}
