use crate::error::AppError;
use crate::models::*;
use crate::services::{LedgerService, NotificationService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

pub async fn deduct(
    ledger_service: web::Data<LedgerService>,
    notification_service: web::Data<NotificationService>,
    request: web::Json<DeductRequest>,
) -> Result<HttpResponse> {
    let req = request.into_inner();

    match ledger_service.deduct(req.telegram_id, req.amount).await {
        Ok(balance) => {
            // The warning rides on the deduct but must never fail it.
            if balance == 1 {
                if let Err(e) = notification_service
                    .send_low_balance_warning(req.telegram_id)
                    .await
                {
                    log::error!(
                        "Failed to send low-balance warning to {}: {e:?}",
                        req.telegram_id
                    );
                }
            }
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": BalanceResponse {
                    telegram_id: req.telegram_id,
                    balance,
                }
            })))
        }
        Err(e) => {
            if matches!(e, AppError::InsufficientBalance) {
                if let Err(e) = notification_service
                    .send_credits_exhausted(req.telegram_id)
                    .await
                {
                    log::error!(
                        "Failed to send credits-exhausted notice to {}: {e:?}",
                        req.telegram_id
                    );
                }
            }
            Ok(e.error_response())
        }
    }
}

pub async fn refund(
    ledger_service: web::Data<LedgerService>,
    request: web::Json<RefundRequest>,
) -> Result<HttpResponse> {
    let req = request.into_inner();

    match ledger_service.refund(req.telegram_id, req.amount).await {
        Ok(balance) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": BalanceResponse {
                telegram_id: req.telegram_id,
                balance,
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn ledger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/ledger")
            .route("/deduct", web::post().to(deduct))
            .route("/refund", web::post().to(refund)),
    );
}
