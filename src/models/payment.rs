use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub telegram_id: i64,
    pub package_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreateInvoiceResponse {
    pub invoice_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub telegram_id: i64,
    pub package_id: String,
    pub credits: i64,
    pub price_minor: i64,
}

#[derive(Debug, Serialize)]
pub struct ConfirmPaymentResponse {
    pub balance: i64,
    pub first_purchase: bool,
    pub referrer_credited: Option<i64>,
}
