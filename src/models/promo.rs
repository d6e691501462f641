use crate::entities::promo_code_entity as promo_codes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RedeemPromoRequest {
    pub telegram_id: i64,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct RedeemPromoResponse {
    pub code: String,
    pub credits_granted: i64,
    pub balance: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreatePromoCodeRequest {
    pub credits: i64,
    pub max_uses: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct PromoCodeResponse {
    pub code: String,
    pub credits: i64,
    pub max_uses: Option<i64>,
    pub times_used: i64,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<promo_codes::Model> for PromoCodeResponse {
    fn from(m: promo_codes::Model) -> Self {
        Self {
            code: m.code,
            credits: m.credits,
            max_uses: m.max_uses,
            times_used: m.times_used,
            expires_at: m.expires_at,
        }
    }
}
