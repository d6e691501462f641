use crate::config::EngagementConfig;
use crate::entities::{
    generation_entity as generations, notification_log_entity as notification_log,
    pending_invoice_entity as invoices, user_entity as users, GenerationStatus,
};
use crate::error::AppResult;
use crate::models::{DispatchStatus, NotificationType};
use crate::services::NotificationService;
use chrono::{Datelike, Duration, Utc};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter};

/// Periodic eligibility queries. Each method expresses one trigger rule
/// against the store and hands the candidates to the dispatch engine, which
/// still enforces its own dedup and daily-cap guards.
#[derive(Clone)]
pub struct EngagementJobService {
    pool: DatabaseConnection,
    notifications: NotificationService,
    engagement: EngagementConfig,
}

impl EngagementJobService {
    pub fn new(
        pool: DatabaseConnection,
        notifications: NotificationService,
        engagement: EngagementConfig,
    ) -> Self {
        Self {
            pool,
            notifications,
            engagement,
        }
    }

    /// The daily batch: welcome reminders, re-engagement, and (on the
    /// configured weekday) win-back. Returns the total number of messages
    /// sent.
    pub async fn run_daily_batch(&self) -> AppResult<u64> {
        let mut sent = self.send_welcome_reminders().await?;
        sent += self.send_reengagement().await?;

        let today = Utc::now().date_naive();
        if today.weekday().num_days_from_monday() == self.engagement.winback_weekday {
            sent += self.send_winback().await?;
        }

        Ok(sent)
    }

    /// Accounts registered 24-48h ago that still hold credits and never
    /// generated anything.
    pub async fn send_welcome_reminders(&self) -> AppResult<u64> {
        let now = Utc::now();
        let candidates = users::Entity::find()
            .filter(users::Column::CreatedAt.lt(now - Duration::hours(24)))
            .filter(users::Column::CreatedAt.gte(now - Duration::hours(48)))
            .filter(users::Column::Credits.gt(0))
            .filter(
                users::Column::TelegramId.not_in_subquery(
                    Query::select()
                        .column(generations::Column::UserId)
                        .from(generations::Entity)
                        .to_owned(),
                ),
            )
            .all(&self.pool)
            .await?;

        log::info!(
            "Found {} users eligible for welcome reminder",
            candidates.len()
        );

        let mut sent = 0u64;
        for user in &candidates {
            match self.notifications.send_welcome_reminder(user).await {
                Ok(DispatchStatus::Sent) => sent += 1,
                Ok(_) => {}
                Err(e) => log::error!(
                    "Failed to send welcome reminder to {}: {e:?}",
                    user.telegram_id
                ),
            }
            self.pace().await;
        }
        log::info!("Sent {sent}/{} welcome reminders", candidates.len());
        Ok(sent)
    }

    /// Accounts at zero balance, inactive beyond the threshold, that never
    /// got this message before.
    pub async fn send_reengagement(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - Duration::days(self.engagement.reengagement_inactive_days);
        let candidates = users::Entity::find()
            .filter(users::Column::Credits.eq(0))
            .filter(Self::inactive_since(cutoff))
            .filter(
                users::Column::TelegramId.not_in_subquery(Self::notified_subquery(
                    NotificationType::Reengagement.as_str(),
                )),
            )
            .all(&self.pool)
            .await?;

        log::info!("Found {} users eligible for re-engagement", candidates.len());

        let mut sent = 0u64;
        for user in &candidates {
            match self.notifications.send_reengagement(user.telegram_id).await {
                Ok(DispatchStatus::Sent) => sent += 1,
                Ok(_) => {}
                Err(e) => log::error!(
                    "Failed to send re-engagement to {}: {e:?}",
                    user.telegram_id
                ),
            }
            self.pace().await;
        }
        Ok(sent)
    }

    /// Long-inactive accounts with at least one successful generation that
    /// never got a win-back; a successful send also grants the bonus.
    pub async fn send_winback(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - Duration::days(self.engagement.winback_inactive_days);
        let candidates = users::Entity::find()
            .filter(Self::inactive_since(cutoff))
            .filter(
                users::Column::TelegramId.in_subquery(
                    Query::select()
                        .column(generations::Column::UserId)
                        .from(generations::Entity)
                        .and_where(
                            Expr::col(generations::Column::Status)
                                .eq(GenerationStatus::Success.to_string()),
                        )
                        .to_owned(),
                ),
            )
            .filter(
                users::Column::TelegramId
                    .not_in_subquery(Self::notified_subquery(NotificationType::WinBack.as_str())),
            )
            .all(&self.pool)
            .await?;

        log::info!("Found {} users eligible for win-back", candidates.len());

        let mut sent = 0u64;
        for user in &candidates {
            match self.notifications.send_winback(user.telegram_id).await {
                Ok(DispatchStatus::Sent) => sent += 1,
                Ok(_) => {}
                Err(e) => {
                    log::error!("Failed to send win-back to {}: {e:?}", user.telegram_id)
                }
            }
            self.pace().await;
        }
        Ok(sent)
    }

    /// Invoices past the abandonment delay that were neither paid nor
    /// reminded about.
    pub async fn send_abandoned_payment_reminders(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - Duration::minutes(self.engagement.abandoned_invoice_delay_minutes);
        let stale = invoices::Entity::find()
            .filter(invoices::Column::Paid.eq(false))
            .filter(invoices::Column::Notified.eq(false))
            .filter(invoices::Column::SentAt.lt(cutoff))
            .all(&self.pool)
            .await?;

        if !stale.is_empty() {
            log::info!("Found {} abandoned invoices", stale.len());
        }

        let mut sent = 0u64;
        for invoice in &stale {
            match self.notifications.send_abandoned_payment(invoice).await {
                Ok(DispatchStatus::Sent) => sent += 1,
                Ok(_) => {}
                Err(e) => log::error!(
                    "Failed to send abandoned-payment reminder for invoice {}: {e:?}",
                    invoice.id
                ),
            }
            self.pace().await;
        }
        Ok(sent)
    }

    /// Ad-hoc broadcast to accounts active within the window. Returns
    /// (eligible, sent).
    pub async fn broadcast(
        &self,
        notification_id: &str,
        text: &str,
        active_within_days: i64,
    ) -> AppResult<(u64, u64)> {
        let cutoff = Utc::now() - Duration::days(active_within_days);
        let candidates = users::Entity::find()
            .filter(users::Column::LastActiveAt.gte(cutoff))
            .all(&self.pool)
            .await?;

        let eligible = candidates.len() as u64;
        let mut sent = 0u64;
        for user in &candidates {
            match self
                .notifications
                .send_broadcast(user.telegram_id, notification_id, text)
                .await
            {
                Ok(DispatchStatus::Sent) => sent += 1,
                Ok(_) => {}
                Err(e) => {
                    log::error!("Broadcast to {} failed: {e:?}", user.telegram_id)
                }
            }
            self.pace().await;
        }
        log::info!("Broadcast {notification_id}: sent {sent}/{eligible}");
        Ok((eligible, sent))
    }

    fn inactive_since(cutoff: chrono::DateTime<Utc>) -> Condition {
        // Accounts that never recorded activity fall back to their signup
        // time.
        Condition::any()
            .add(users::Column::LastActiveAt.lt(cutoff))
            .add(
                Condition::all()
                    .add(users::Column::LastActiveAt.is_null())
                    .add(users::Column::CreatedAt.lt(cutoff)),
            )
    }

    fn notified_subquery(notif_type: &str) -> sea_orm::sea_query::SelectStatement {
        Query::select()
            .column(notification_log::Column::UserId)
            .from(notification_log::Entity)
            .and_where(Expr::col(notification_log::Column::NotificationType).eq(notif_type))
            .to_owned()
    }

    /// Transport rate limit between individual sends.
    async fn pace(&self) {
        tokio::time::sleep(std::time::Duration::from_millis(
            self.engagement.send_interval_ms,
        ))
        .await;
    }
}
