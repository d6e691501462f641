use crate::entities::user_entity as users;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SyncAccountRequest {
    pub telegram_id: i64,
    pub username: Option<String>,
    /// Referrer's telegram id from a referral deep link; only honored at
    /// account creation.
    pub referred_by: Option<i64>,
    /// Acquisition source tag from a campaign deep link.
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub credits: i64,
    pub total_spent: i64,
    pub referred_by: Option<i64>,
    pub acquisition_source: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_active_at: Option<DateTime<Utc>>,
}

impl From<users::Model> for AccountResponse {
    fn from(m: users::Model) -> Self {
        Self {
            telegram_id: m.telegram_id,
            username: m.username,
            credits: m.credits,
            total_spent: m.total_spent,
            referred_by: m.referred_by,
            acquisition_source: m.acquisition_source,
            created_at: m.created_at,
            last_active_at: m.last_active_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SyncAccountResponse {
    pub account: AccountResponse,
    pub is_new: bool,
}
