use crate::models::*;
use crate::services::{EngagementJobService, PromoService, StatsService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

pub async fn create_promo_code(
    promo_service: web::Data<PromoService>,
    request: web::Json<CreatePromoCodeRequest>,
) -> Result<HttpResponse> {
    let req = request.into_inner();

    match promo_service
        .create_code(req.credits, req.max_uses, req.expires_at)
        .await
    {
        Ok(model) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": PromoCodeResponse::from(model)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn get_stats(stats_service: web::Data<StatsService>) -> Result<HttpResponse> {
    match stats_service.get_stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn broadcast(
    job_service: web::Data<EngagementJobService>,
    request: web::Json<BroadcastRequest>,
) -> Result<HttpResponse> {
    let req = request.into_inner();

    match job_service
        .broadcast(&req.notification_id, &req.text, req.active_within_days)
        .await
    {
        Ok((eligible, sent)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": BroadcastResponse { eligible, sent }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/promo-codes", web::post().to(create_promo_code))
            .route("/stats", web::get().to(get_stats))
            .route("/broadcast", web::post().to(broadcast)),
    );
}
