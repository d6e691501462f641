mod common;

use chrono::{Duration, Utc};
use common::{create_user, setup_db};
use sea_orm::{EntityTrait, PaginatorTrait};
use sparkpic_backend::config::CreditsConfig;
use sparkpic_backend::entities::promo_redemption_entity as redemptions;
use sparkpic_backend::error::AppError;
use sparkpic_backend::services::{LedgerService, PromoService};

fn services(db: &sea_orm::DatabaseConnection) -> PromoService {
    let ledger = LedgerService::new(db.clone(), CreditsConfig::default());
    PromoService::new(db.clone(), ledger)
}

#[tokio::test]
async fn a_code_redeems_once_per_account() {
    let db = setup_db().await;
    let promo = services(&db);
    create_user(&db, 1, 0).await;

    let code = promo.create_code(10, None, None).await.unwrap();
    let (granted, balance) = promo.redeem(1, &code.code).await.unwrap();
    assert_eq!(granted, 10);
    assert_eq!(balance, 10);

    let err = promo.redeem(1, &code.code).await.unwrap_err();
    assert!(matches!(err, AppError::PromoAlreadyRedeemed));

    // The failed retry changed nothing.
    let ledger = LedgerService::new(db.clone(), CreditsConfig::default());
    assert_eq!(ledger.balance(1).await.unwrap(), 10);
    assert_eq!(
        redemptions::Entity::find().count(&db).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn a_capped_code_has_exactly_one_winner() {
    let db = setup_db().await;
    let promo = services(&db);
    create_user(&db, 1, 0).await;
    create_user(&db, 2, 0).await;

    let code = promo.create_code(5, Some(1), None).await.unwrap();
    promo.redeem(1, &code.code).await.unwrap();

    let err = promo.redeem(2, &code.code).await.unwrap_err();
    assert!(matches!(err, AppError::PromoCodeExhausted));

    let ledger = LedgerService::new(db.clone(), CreditsConfig::default());
    assert_eq!(ledger.balance(2).await.unwrap(), 0);
}

#[tokio::test]
async fn near_simultaneous_redemptions_grant_exactly_once() {
    let db = setup_db().await;
    let promo = services(&db);
    create_user(&db, 1, 0).await;
    create_user(&db, 2, 0).await;

    let code = promo.create_code(5, Some(1), None).await.unwrap();

    let a = tokio::spawn({
        let promo = promo.clone();
        let code = code.code.clone();
        async move { promo.redeem(1, &code).await }
    });
    let b = tokio::spawn({
        let promo = promo.clone();
        let code = code.code.clone();
        async move { promo.redeem(2, &code).await }
    });
    let results = [a.await.unwrap(), b.await.unwrap()];

    // Exactly one winner, never two, never zero.
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(AppError::PromoCodeExhausted))));

    // The loser's balance is untouched: credits went out exactly once.
    let ledger = LedgerService::new(db.clone(), CreditsConfig::default());
    let balances = (
        ledger.balance(1).await.unwrap(),
        ledger.balance(2).await.unwrap(),
    );
    assert!(balances == (5, 0) || balances == (0, 5));
    assert_eq!(
        redemptions::Entity::find().count(&db).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn expired_codes_are_refused_with_their_own_outcome() {
    let db = setup_db().await;
    let promo = services(&db);
    create_user(&db, 1, 0).await;

    let expired = Utc::now() - Duration::hours(1);
    let code = promo.create_code(5, None, Some(expired)).await.unwrap();

    let err = promo.redeem(1, &code.code).await.unwrap_err();
    assert!(matches!(err, AppError::PromoCodeExpired));
}

#[tokio::test]
async fn unknown_codes_are_not_found() {
    let db = setup_db().await;
    let promo = services(&db);
    create_user(&db, 1, 0).await;

    let err = promo.redeem(1, "PROMO-NOPE").await.unwrap_err();
    assert!(matches!(err, AppError::PromoCodeNotFound));
}

#[tokio::test]
async fn codes_match_case_insensitively() {
    let db = setup_db().await;
    let promo = services(&db);
    create_user(&db, 1, 0).await;

    let code = promo.create_code(5, None, None).await.unwrap();
    let sloppy = format!("  {}  ", code.code.to_ascii_lowercase());

    let (granted, _) = promo.redeem(1, &sloppy).await.unwrap();
    assert_eq!(granted, 5);
}

#[tokio::test]
async fn already_redeemed_wins_over_later_expiry() {
    // A user retrying a code they used gets the stable answer even after
    // the code expires.
    let db = setup_db().await;
    let promo = services(&db);
    create_user(&db, 1, 0).await;

    let soon = Utc::now() + Duration::milliseconds(50);
    let code = promo.create_code(5, None, Some(soon)).await.unwrap();
    promo.redeem(1, &code.code).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    let err = promo.redeem(1, &code.code).await.unwrap_err();
    assert!(matches!(err, AppError::PromoAlreadyRedeemed));
}

#[tokio::test]
async fn minting_validates_its_inputs() {
    let db = setup_db().await;
    let promo = services(&db);

    assert!(matches!(
        promo.create_code(0, None, None).await.unwrap_err(),
        AppError::ValidationError(_)
    ));
    assert!(matches!(
        promo.create_code(5, Some(0), None).await.unwrap_err(),
        AppError::ValidationError(_)
    ));
}
