use crate::entities::GenerationStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RecordGenerationRequest {
    pub telegram_id: i64,
    pub effect_id: String,
    pub status: GenerationStatus,
}

#[derive(Debug, Serialize)]
pub struct RecordGenerationResponse {
    pub balance: i64,
    /// Referrer credited as a side effect of this (first successful)
    /// generation, if any.
    pub referrer_credited: Option<i64>,
}
