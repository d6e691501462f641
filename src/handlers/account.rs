use crate::models::*;
use crate::services::AccountService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

pub async fn sync_account(
    account_service: web::Data<AccountService>,
    request: web::Json<SyncAccountRequest>,
) -> Result<HttpResponse> {
    match account_service.get_or_create(&request).await {
        Ok((account, is_new)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": SyncAccountResponse {
                account: account.into(),
                is_new,
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn get_account(
    account_service: web::Data<AccountService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match account_service.get(path.into_inner()).await {
        Ok(account) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": AccountResponse::from(account)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn account_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/accounts")
            .route("/sync", web::post().to(sync_account))
            .route("/{telegram_id}", web::get().to(get_account)),
    );
}
