mod common;

use common::{create_user, setup_db};
use sparkpic_backend::error::AppError;
use sparkpic_backend::models::SyncAccountRequest;
use sparkpic_backend::services::AccountService;

fn sync_request(telegram_id: i64) -> SyncAccountRequest {
    SyncAccountRequest {
        telegram_id,
        username: None,
        referred_by: None,
        source: None,
    }
}

#[tokio::test]
async fn first_contact_creates_the_account_with_the_starting_balance() {
    let db = setup_db().await;
    let accounts = AccountService::new(db.clone(), 3);

    let (account, is_new) = accounts
        .get_or_create(&SyncAccountRequest {
            telegram_id: 1,
            username: Some("alice".to_string()),
            referred_by: Some(42),
            source: Some("ad_campaign_a".to_string()),
        })
        .await
        .unwrap();

    assert!(is_new);
    assert_eq!(account.credits, 3);
    assert_eq!(account.referred_by, Some(42));
    assert_eq!(account.acquisition_source.as_deref(), Some("ad_campaign_a"));

    // The second sync finds the same account and grants nothing extra.
    let (account, is_new) = accounts.get_or_create(&sync_request(1)).await.unwrap();
    assert!(!is_new);
    assert_eq!(account.credits, 3);
}

#[tokio::test]
async fn a_revisit_refreshes_the_display_name() {
    let db = setup_db().await;
    let accounts = AccountService::new(db.clone(), 3);

    accounts
        .get_or_create(&SyncAccountRequest {
            telegram_id: 1,
            username: Some("alice".to_string()),
            referred_by: None,
            source: None,
        })
        .await
        .unwrap();

    let (account, is_new) = accounts
        .get_or_create(&SyncAccountRequest {
            telegram_id: 1,
            username: Some("alice_renamed".to_string()),
            referred_by: None,
            source: None,
        })
        .await
        .unwrap();

    assert!(!is_new);
    assert_eq!(account.username.as_deref(), Some("alice_renamed"));
}

#[tokio::test]
async fn referrer_and_source_are_fixed_at_creation() {
    let db = setup_db().await;
    let accounts = AccountService::new(db.clone(), 3);

    accounts.get_or_create(&sync_request(1)).await.unwrap();

    // A later sync carrying a referral link must not rewrite history.
    let (account, _) = accounts
        .get_or_create(&SyncAccountRequest {
            telegram_id: 1,
            username: None,
            referred_by: Some(42),
            source: Some("late_campaign".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(account.referred_by, None);
    assert_eq!(account.acquisition_source, None);
}

#[tokio::test]
async fn self_referrals_are_dropped() {
    let db = setup_db().await;
    let accounts = AccountService::new(db.clone(), 3);

    let (account, _) = accounts
        .get_or_create(&SyncAccountRequest {
            telegram_id: 1,
            username: None,
            referred_by: Some(1),
            source: None,
        })
        .await
        .unwrap();

    assert_eq!(account.referred_by, None);
}

#[tokio::test]
async fn lookups_of_unknown_accounts_fail_cleanly() {
    let db = setup_db().await;
    let accounts = AccountService::new(db.clone(), 3);

    let err = accounts.get(99).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn purchases_and_generations_are_counted_per_account() {
    let db = setup_db().await;
    let accounts = AccountService::new(db.clone(), 3);
    create_user(&db, 1, 0).await;
    create_user(&db, 2, 0).await;

    accounts.record_purchase(1, 10, 499).await.unwrap();
    accounts.record_purchase(1, 25, 999).await.unwrap();
    accounts.record_purchase(2, 10, 499).await.unwrap();

    assert_eq!(accounts.purchase_count(1).await.unwrap(), 2);
    assert_eq!(accounts.purchase_count(2).await.unwrap(), 1);
    assert_eq!(accounts.generation_count(1).await.unwrap(), 0);
}
