use crate::models::*;
use crate::services::PromoService;
use crate::utils::normalize_promo_code;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

pub async fn redeem_promo(
    promo_service: web::Data<PromoService>,
    request: web::Json<RedeemPromoRequest>,
) -> Result<HttpResponse> {
    let req = request.into_inner();

    match promo_service.redeem(req.telegram_id, &req.code).await {
        Ok((credits_granted, balance)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": RedeemPromoResponse {
                code: normalize_promo_code(&req.code),
                credits_granted,
                balance,
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn promo_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/promo").route("/redeem", web::post().to(redeem_promo)));
}
