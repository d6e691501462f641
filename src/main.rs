use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use sparkpic_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::TelegramTransport,
    handlers,
    middlewares::AuthMiddleware,
    services::*,
    tasks,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration file");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let transport = Arc::new(TelegramTransport::new(config.telegram.clone()));

    let ledger_service = LedgerService::new(pool.clone(), config.credits.clone());
    let account_service = AccountService::new(pool.clone(), config.credits.starting_balance);
    let promo_service = PromoService::new(pool.clone(), ledger_service.clone());
    let notification_service = NotificationService::new(
        pool.clone(),
        transport,
        ledger_service.clone(),
        config.telegram.bot_username.clone(),
    );
    let stats_service = StatsService::new(pool.clone());
    let job_service = EngagementJobService::new(
        pool.clone(),
        notification_service.clone(),
        config.engagement.clone(),
    );

    tasks::spawn_all(job_service.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let service_token = config.server.service_token.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(AuthMiddleware::new(service_token.clone()))
            .app_data(web::Data::new(ledger_service.clone()))
            .app_data(web::Data::new(account_service.clone()))
            .app_data(web::Data::new(promo_service.clone()))
            .app_data(web::Data::new(notification_service.clone()))
            .app_data(web::Data::new(stats_service.clone()))
            .app_data(web::Data::new(job_service.clone()))
            .configure(handlers::health_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::account_config)
                    .configure(handlers::ledger_config)
                    .configure(handlers::generation_config)
                    .configure(handlers::promo_config)
                    .configure(handlers::payment_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
