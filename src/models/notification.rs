use serde::{Deserialize, Serialize};

/// The fixed set of engagement notifications.
///
/// Scheduled-class types share a single-message-per-account-per-day cap;
/// real-time types fire as an immediate consequence of a user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    /// Nudge for new accounts that never generated.
    WelcomeReminder,
    /// Balance just dropped to exactly one remaining credit.
    LowBalance,
    /// A deduct was attempted at zero balance.
    CreditsExhausted,
    /// Zero balance and inactive for a while.
    Reengagement,
    /// Long-inactive account that generated at least once; comes with a
    /// credit bonus.
    WinBack,
    /// Thank-you after the first completed purchase.
    FirstPurchaseThanks,
    /// Reminder for an unpaid checkout.
    AbandonedPayment,
}

/// Types subject to the shared one-per-day politeness cap.
pub const SCHEDULED_TYPES: &[&str] = &["welcome_reminder", "reengagement", "winback"];

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::WelcomeReminder => "welcome_reminder",
            NotificationType::LowBalance => "low_balance",
            NotificationType::CreditsExhausted => "credits_exhausted",
            NotificationType::Reengagement => "reengagement",
            NotificationType::WinBack => "winback",
            NotificationType::FirstPurchaseThanks => "first_purchase_thanks",
            NotificationType::AbandonedPayment => "abandoned_payment",
        }
    }

    /// Daily-batch class, capped to one message per account per day.
    pub fn is_scheduled(&self) -> bool {
        SCHEDULED_TYPES.contains(&self.as_str())
    }

    /// Whether repeat sends of the same type to the same account are
    /// legitimate (each occurrence is independently notable).
    pub fn allows_duplicate(&self) -> bool {
        matches!(
            self,
            NotificationType::LowBalance
                | NotificationType::CreditsExhausted
                | NotificationType::AbandonedPayment
        )
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOptions {
    pub allow_duplicate: bool,
    pub scheduled: bool,
}

impl DispatchOptions {
    pub fn for_type(t: NotificationType) -> Self {
        Self {
            allow_duplicate: t.allows_duplicate(),
            scheduled: t.is_scheduled(),
        }
    }
}

/// Outcome of a dispatch attempt. The non-`Sent` variants are expected
/// business outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Sent,
    AlreadySent,
    DailyCapReached,
}

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    /// Ad-hoc notification id recorded in the log, e.g. "broadcast_2025_08".
    pub notification_id: String,
    pub text: String,
    /// Only accounts active within this many days receive the broadcast.
    pub active_within_days: i64,
}

#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub eligible: u64,
    pub sent: u64,
}
