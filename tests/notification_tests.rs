mod common;

use common::{FakeTransport, create_user, setup_db};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use sparkpic_backend::config::CreditsConfig;
use sparkpic_backend::entities::notification_log_entity as notification_log;
use sparkpic_backend::entities::pending_invoice_entity as invoices;
use sparkpic_backend::models::DispatchStatus;
use sparkpic_backend::services::{AccountService, LedgerService, NotificationService};
use std::sync::Arc;

fn service(
    db: &DatabaseConnection,
    transport: Arc<FakeTransport>,
) -> NotificationService {
    let ledger = LedgerService::new(db.clone(), CreditsConfig::default());
    NotificationService::new(db.clone(), transport, ledger, "testbot".to_string())
}

async fn log_rows(db: &DatabaseConnection) -> u64 {
    notification_log::Entity::find().count(db).await.unwrap()
}

#[tokio::test]
async fn a_non_repeating_notification_goes_out_once() {
    let db = setup_db().await;
    let transport = Arc::new(FakeTransport::default());
    let svc = service(&db, transport.clone());
    let user = create_user(&db, 1, 3).await;

    assert_eq!(
        svc.send_welcome_reminder(&user).await.unwrap(),
        DispatchStatus::Sent
    );
    assert_eq!(
        svc.send_welcome_reminder(&user).await.unwrap(),
        DispatchStatus::AlreadySent
    );

    assert_eq!(transport.sent_count(), 1);
    assert_eq!(log_rows(&db).await, 1);
}

#[tokio::test]
async fn one_scheduled_message_per_account_per_day() {
    let db = setup_db().await;
    let transport = Arc::new(FakeTransport::default());
    let svc = service(&db, transport.clone());
    let user = create_user(&db, 1, 3).await;

    assert_eq!(
        svc.send_welcome_reminder(&user).await.unwrap(),
        DispatchStatus::Sent
    );
    // A different scheduled type still counts against the same daily cap.
    assert_eq!(
        svc.send_reengagement(1).await.unwrap(),
        DispatchStatus::DailyCapReached
    );

    assert_eq!(transport.sent_count(), 1);
    assert_eq!(log_rows(&db).await, 1);
}

#[tokio::test]
async fn a_failed_send_leaves_no_record_and_stays_retryable() {
    let db = setup_db().await;
    let transport = Arc::new(FakeTransport::default());
    let svc = service(&db, transport.clone());
    create_user(&db, 1, 0).await;

    transport.fail_next();
    assert!(svc.send_reengagement(1).await.is_err());
    assert_eq!(log_rows(&db).await, 0);

    // The retry is a fresh attempt, not a duplicate.
    assert_eq!(
        svc.send_reengagement(1).await.unwrap(),
        DispatchStatus::Sent
    );
    assert_eq!(transport.sent_count(), 1);
    assert_eq!(log_rows(&db).await, 1);
}

#[tokio::test]
async fn event_driven_warnings_may_repeat() {
    let db = setup_db().await;
    let transport = Arc::new(FakeTransport::default());
    let svc = service(&db, transport.clone());
    create_user(&db, 1, 1).await;

    assert_eq!(
        svc.send_low_balance_warning(1).await.unwrap(),
        DispatchStatus::Sent
    );
    assert_eq!(
        svc.send_low_balance_warning(1).await.unwrap(),
        DispatchStatus::Sent
    );
    assert_eq!(transport.sent_count(), 2);
    assert_eq!(log_rows(&db).await, 2);
}

#[tokio::test]
async fn winback_grants_the_bonus_only_on_a_real_send() {
    let db = setup_db().await;
    let transport = Arc::new(FakeTransport::default());
    let svc = service(&db, transport.clone());
    create_user(&db, 1, 0).await;

    let ledger = LedgerService::new(db.clone(), CreditsConfig::default());
    let bonus = CreditsConfig::default().winback_bonus;

    assert_eq!(svc.send_winback(1).await.unwrap(), DispatchStatus::Sent);
    assert_eq!(ledger.balance(1).await.unwrap(), bonus);

    // The dedup guard also blocks a second bonus.
    assert_eq!(
        svc.send_winback(1).await.unwrap(),
        DispatchStatus::AlreadySent
    );
    assert_eq!(ledger.balance(1).await.unwrap(), bonus);
}

#[tokio::test]
async fn winback_does_not_grant_when_the_send_fails() {
    let db = setup_db().await;
    let transport = Arc::new(FakeTransport::default());
    let svc = service(&db, transport.clone());
    create_user(&db, 1, 0).await;

    let ledger = LedgerService::new(db.clone(), CreditsConfig::default());

    transport.fail_next();
    assert!(svc.send_winback(1).await.is_err());
    assert_eq!(ledger.balance(1).await.unwrap(), 0);
}

#[tokio::test]
async fn abandoned_payment_reminder_marks_the_invoice() {
    let db = setup_db().await;
    let transport = Arc::new(FakeTransport::default());
    let svc = service(&db, transport.clone());
    create_user(&db, 1, 0).await;

    let accounts = AccountService::new(db.clone(), 3);
    let invoice = accounts.record_invoice(1, "pack_10").await.unwrap();
    assert!(!invoice.notified);

    assert_eq!(
        svc.send_abandoned_payment(&invoice).await.unwrap(),
        DispatchStatus::Sent
    );

    let updated = invoices::Entity::find_by_id(invoice.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(updated.notified);
}

#[tokio::test]
async fn broadcasts_repeat_under_the_same_id() {
    let db = setup_db().await;
    let transport = Arc::new(FakeTransport::default());
    let svc = service(&db, transport.clone());
    create_user(&db, 1, 0).await;

    assert_eq!(
        svc.send_broadcast(1, "launch_2025_08", "We shipped!")
            .await
            .unwrap(),
        DispatchStatus::Sent
    );
    assert_eq!(
        svc.send_broadcast(1, "launch_2025_08", "We shipped!")
            .await
            .unwrap(),
        DispatchStatus::Sent
    );
    assert_eq!(transport.sent_count(), 2);
}
