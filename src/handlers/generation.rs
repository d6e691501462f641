use crate::entities::GenerationStatus;
use crate::error::AppError;
use crate::models::*;
use crate::services::{AccountService, LedgerService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

pub async fn record_generation(
    account_service: web::Data<AccountService>,
    ledger_service: web::Data<LedgerService>,
    request: web::Json<RecordGenerationRequest>,
) -> Result<HttpResponse> {
    let req = request.into_inner();

    let result = async {
        account_service
            .record_generation(req.telegram_id, &req.effect_id, req.status.clone())
            .await?;

        let mut referrer_credited = None;
        if req.status == GenerationStatus::Success {
            account_service.touch_last_active(req.telegram_id).await?;
            referrer_credited = ledger_service
                .credit_referral_on_first_generation(req.telegram_id)
                .await?;
        }

        let balance = ledger_service.balance(req.telegram_id).await?;
        Ok::<_, AppError>(RecordGenerationResponse {
            balance,
            referrer_credited,
        })
    }
    .await;

    match result {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn generation_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/generations").route("", web::post().to(record_generation)));
}
