use serde::{Deserialize, Serialize};

fn default_amount() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct DeductRequest {
    pub telegram_id: i64,
    #[serde(default = "default_amount")]
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub telegram_id: i64,
    #[serde(default = "default_amount")]
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub telegram_id: i64,
    pub balance: i64,
}
