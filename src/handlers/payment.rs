use crate::error::AppError;
use crate::models::*;
use crate::services::{AccountService, LedgerService, NotificationService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

/// Records that an invoice went out so the abandoned-payment job can follow
/// up if it is never paid.
pub async fn create_invoice(
    account_service: web::Data<AccountService>,
    request: web::Json<CreateInvoiceRequest>,
) -> Result<HttpResponse> {
    let req = request.into_inner();

    match account_service
        .record_invoice(req.telegram_id, &req.package_id)
        .await
    {
        Ok(invoice) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": CreateInvoiceResponse {
                invoice_id: invoice.id,
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// Called after the payment provider confirmed the charge. Credits the
/// account, closes the open invoice, and fires the follow-ups.
pub async fn confirm_payment(
    account_service: web::Data<AccountService>,
    ledger_service: web::Data<LedgerService>,
    notification_service: web::Data<NotificationService>,
    request: web::Json<ConfirmPaymentRequest>,
) -> Result<HttpResponse> {
    let req = request.into_inner();

    let result = async {
        let balance = ledger_service.grant(req.telegram_id, req.credits).await?;
        account_service
            .record_purchase(req.telegram_id, req.credits, req.price_minor)
            .await?;
        account_service
            .mark_invoice_paid(req.telegram_id, &req.package_id)
            .await?;
        account_service.touch_last_active(req.telegram_id).await?;

        let first_purchase = account_service.purchase_count(req.telegram_id).await? == 1;
        let referrer_credited = ledger_service
            .credit_referral_on_first_payment(req.telegram_id)
            .await?;

        Ok::<_, AppError>(ConfirmPaymentResponse {
            balance,
            first_purchase,
            referrer_credited,
        })
    }
    .await;

    match result {
        Ok(response) => {
            if response.first_purchase {
                if let Err(e) = notification_service
                    .send_first_purchase_thanks(req.telegram_id)
                    .await
                {
                    log::error!(
                        "Failed to send first-purchase thanks to {}: {e:?}",
                        req.telegram_id
                    );
                }
            }
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": response
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("/invoice", web::post().to(create_invoice))
            .route("/confirm", web::post().to(confirm_payment)),
    );
}
