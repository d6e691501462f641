use crate::entities::{
    notification_log_entity as notification_log, pending_invoice_entity as invoices,
    user_entity as users,
};
use crate::error::AppResult;
use crate::external::MessageTransport;
use crate::models::{DispatchOptions, DispatchStatus, NotificationType, SCHEDULED_TYPES};
use crate::services::LedgerService;
use chrono::{NaiveTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;

/// Decides whether and how often an automated message may go out, delivers
/// it, and keeps the books. The transport is injected so tests can swap in a
/// fake and multiple instances stay isolated.
#[derive(Clone)]
pub struct NotificationService {
    pool: DatabaseConnection,
    transport: Arc<dyn MessageTransport>,
    ledger: LedgerService,
    bot_username: String,
}

impl NotificationService {
    pub fn new(
        pool: DatabaseConnection,
        transport: Arc<dyn MessageTransport>,
        ledger: LedgerService,
        bot_username: String,
    ) -> Self {
        Self {
            pool,
            transport,
            ledger,
            bot_username,
        }
    }

    /// Core dispatch path. Dedup checks run before the external call so a
    /// duplicate is never paid for; the log row is written only after the
    /// transport confirmed delivery, so a failed send stays retryable and a
    /// successful one is never unlogged.
    pub async fn dispatch(
        &self,
        telegram_id: i64,
        notif_type: &str,
        text: &str,
        opts: DispatchOptions,
    ) -> AppResult<DispatchStatus> {
        if !opts.allow_duplicate && self.already_sent(telegram_id, notif_type).await? {
            log::info!("Notification {notif_type} already sent to user {telegram_id}");
            return Ok(DispatchStatus::AlreadySent);
        }

        if opts.scheduled && self.scheduled_sent_today(telegram_id).await? {
            log::info!("Daily cap reached for user {telegram_id}, skipping {notif_type}");
            return Ok(DispatchStatus::DailyCapReached);
        }

        self.transport.send_message(telegram_id, text).await?;

        notification_log::ActiveModel {
            user_id: Set(telegram_id),
            notification_type: Set(notif_type.to_string()),
            sent_at: Set(Utc::now()),
            opened: Set(false),
            clicked: Set(false),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Sent notification {notif_type} to user {telegram_id}");
        Ok(DispatchStatus::Sent)
    }

    async fn already_sent(&self, telegram_id: i64, notif_type: &str) -> AppResult<bool> {
        let row = notification_log::Entity::find()
            .filter(notification_log::Column::UserId.eq(telegram_id))
            .filter(notification_log::Column::NotificationType.eq(notif_type))
            .one(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// One scheduled-class message per account per calendar day, across the
    /// whole class, not per type.
    async fn scheduled_sent_today(&self, telegram_id: i64) -> AppResult<bool> {
        let today_start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
        let row = notification_log::Entity::find()
            .filter(notification_log::Column::UserId.eq(telegram_id))
            .filter(
                notification_log::Column::NotificationType.is_in(SCHEDULED_TYPES.iter().copied()),
            )
            .filter(notification_log::Column::SentAt.gte(today_start))
            .one(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    fn referral_link(&self, telegram_id: i64) -> String {
        format!("https://t.me/{}?start=ref_{}", self.bot_username, telegram_id)
    }

    // ── Typed notifications ──────────────────────────────────────────────

    /// Nudge for accounts that signed up, still hold free credits, and never
    /// tried a single effect.
    pub async fn send_welcome_reminder(&self, user: &users::Model) -> AppResult<DispatchStatus> {
        let name = user.username.as_deref().unwrap_or("there");
        let text = format!(
            "👋 Hi {name}!\n\n\
             You have <b>{} free credits</b> waiting, but haven't tried the magic yet ✨\n\n\
             Pick any effect — it takes a minute!",
            user.credits
        );
        self.dispatch(
            user.telegram_id,
            NotificationType::WelcomeReminder.as_str(),
            &text,
            DispatchOptions::for_type(NotificationType::WelcomeReminder),
        )
        .await
    }

    /// Fired right after a deduct leaves exactly one credit.
    pub async fn send_low_balance_warning(&self, telegram_id: i64) -> AppResult<DispatchStatus> {
        let text = "⚡ <b>Only 1 credit left!</b>\n\n\
                    Top up now or invite a friend to keep creating."
            .to_string();
        self.dispatch(
            telegram_id,
            NotificationType::LowBalance.as_str(),
            &text,
            DispatchOptions::for_type(NotificationType::LowBalance),
        )
        .await
    }

    /// Fired when a deduct is attempted at zero balance.
    pub async fn send_credits_exhausted(&self, telegram_id: i64) -> AppResult<DispatchStatus> {
        let text = format!(
            "😢 <b>You're out of credits!</b>\n\n\
             Grab a package from the store, or invite a friend and get bonus credits for free 👥\n\n\
             Your link:\n<code>{}</code>",
            self.referral_link(telegram_id)
        );
        self.dispatch(
            telegram_id,
            NotificationType::CreditsExhausted.as_str(),
            &text,
            DispatchOptions::for_type(NotificationType::CreditsExhausted),
        )
        .await
    }

    /// For accounts sitting at zero balance that went quiet.
    pub async fn send_reengagement(&self, telegram_id: i64) -> AppResult<DispatchStatus> {
        let text = format!(
            "✨ We miss you!\n\n\
             Your photos are one tap away. Invite a friend for free credits:\n<code>{}</code>",
            self.referral_link(telegram_id)
        );
        self.dispatch(
            telegram_id,
            NotificationType::Reengagement.as_str(),
            &text,
            DispatchOptions::for_type(NotificationType::Reengagement),
        )
        .await
    }

    /// Long-inactive users who generated at least once get a small credit
    /// bonus along with the message.
    pub async fn send_winback(&self, telegram_id: i64) -> AppResult<DispatchStatus> {
        let bonus = self.ledger.winback_bonus();
        let text = format!(
            "🎁 Welcome back gift!\n\n\
             We added <b>{bonus} free credits</b> to your balance. Come make something new ✨"
        );
        let status = self
            .dispatch(
                telegram_id,
                NotificationType::WinBack.as_str(),
                &text,
                DispatchOptions::for_type(NotificationType::WinBack),
            )
            .await?;
        if status == DispatchStatus::Sent {
            self.ledger.grant(telegram_id, bonus).await?;
        }
        Ok(status)
    }

    /// Reminder for a checkout that was started but never paid. Allowed to
    /// repeat across invoices; the notified flag stops a second reminder for
    /// the same invoice.
    pub async fn send_abandoned_payment(
        &self,
        invoice: &invoices::Model,
    ) -> AppResult<DispatchStatus> {
        let text = "💳 Your payment didn't go through.\n\n\
                    The package is still waiting — finish checkout whenever you're ready."
            .to_string();
        let status = self
            .dispatch(
                invoice.user_id,
                NotificationType::AbandonedPayment.as_str(),
                &text,
                DispatchOptions::for_type(NotificationType::AbandonedPayment),
            )
            .await?;
        if status == DispatchStatus::Sent {
            invoices::Entity::update_many()
                .col_expr(invoices::Column::Notified, Expr::value(true))
                .filter(invoices::Column::Id.eq(invoice.id))
                .exec(&self.pool)
                .await?;
        }
        Ok(status)
    }

    /// Thank-you after the first completed purchase.
    pub async fn send_first_purchase_thanks(&self, telegram_id: i64) -> AppResult<DispatchStatus> {
        let text = "💜 Thank you for your first purchase!\n\n\
                    Your credits are ready — enjoy."
            .to_string();
        self.dispatch(
            telegram_id,
            NotificationType::FirstPurchaseThanks.as_str(),
            &text,
            DispatchOptions::for_type(NotificationType::FirstPurchaseThanks),
        )
        .await
    }

    /// Ad-hoc admin broadcast under its own log id; repeats are the
    /// operator's call.
    pub async fn send_broadcast(
        &self,
        telegram_id: i64,
        notification_id: &str,
        text: &str,
    ) -> AppResult<DispatchStatus> {
        self.dispatch(
            telegram_id,
            notification_id,
            text,
            DispatchOptions {
                allow_duplicate: true,
                scheduled: false,
            },
        )
        .await
    }
}
