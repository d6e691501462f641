mod common;

use common::{FakeTransport, create_user, setup_db};
use sparkpic_backend::config::CreditsConfig;
use sparkpic_backend::entities::GenerationStatus;
use sparkpic_backend::services::{
    AccountService, LedgerService, NotificationService, StatsService,
};
use std::sync::Arc;

#[tokio::test]
async fn stats_aggregate_across_the_whole_store() {
    let db = setup_db().await;
    let accounts = AccountService::new(db.clone(), 3);
    let stats = StatsService::new(db.clone());

    create_user(&db, 1, 3).await;
    create_user(&db, 2, 3).await;

    accounts
        .record_generation(1, "cartoon", GenerationStatus::Success)
        .await
        .unwrap();
    accounts
        .record_generation(1, "cartoon", GenerationStatus::Failed)
        .await
        .unwrap();
    accounts
        .record_generation(2, "vintage", GenerationStatus::Success)
        .await
        .unwrap();

    accounts.record_purchase(1, 10, 499).await.unwrap();
    accounts.record_purchase(2, 10, 499).await.unwrap();
    accounts.record_purchase(2, 25, 999).await.unwrap();

    let response = stats.get_stats().await.unwrap();
    assert_eq!(response.total_users, 2);
    assert_eq!(response.total_generations, 3);
    assert_eq!(response.total_purchases, 3);
    assert_eq!(response.total_revenue_minor, 499 + 499 + 999);

    let cartoon = response
        .effect_stats
        .iter()
        .find(|s| s.effect_id == "cartoon")
        .unwrap();
    assert_eq!(cartoon.count, 2);

    let small_pack = response
        .package_stats
        .iter()
        .find(|s| s.credits == 10)
        .unwrap();
    assert_eq!(small_pack.count, 2);
    assert_eq!(small_pack.revenue_minor, 998);
}

#[tokio::test]
async fn notification_stats_count_totals_and_unique_recipients() {
    let db = setup_db().await;
    let transport = Arc::new(FakeTransport::default());
    let ledger = LedgerService::new(db.clone(), CreditsConfig::default());
    let notifications =
        NotificationService::new(db.clone(), transport, ledger, "testbot".to_string());
    let stats = StatsService::new(db.clone());

    create_user(&db, 1, 1).await;
    create_user(&db, 2, 1).await;

    // Low-balance repeats for the same user; the unique count must not.
    notifications.send_low_balance_warning(1).await.unwrap();
    notifications.send_low_balance_warning(1).await.unwrap();
    notifications.send_low_balance_warning(2).await.unwrap();

    let response = stats.get_stats().await.unwrap();
    let row = response
        .notification_stats
        .iter()
        .find(|s| s.notification_type == "low_balance")
        .unwrap();
    assert_eq!(row.total_sent, 3);
    assert_eq!(row.unique_users, 2);
}

#[tokio::test]
async fn an_empty_store_reports_zeroes() {
    let db = setup_db().await;
    let stats = StatsService::new(db.clone());

    let response = stats.get_stats().await.unwrap();
    assert_eq!(response.total_users, 0);
    assert_eq!(response.total_generations, 0);
    assert_eq!(response.total_purchases, 0);
    assert_eq!(response.total_revenue_minor, 0);
    assert!(response.effect_stats.is_empty());
    assert!(response.package_stats.is_empty());
    assert!(response.notification_stats.is_empty());
}
