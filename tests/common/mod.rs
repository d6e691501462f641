use async_trait::async_trait;
use chrono::{DateTime, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sparkpic_backend::entities::user_entity as users;
use sparkpic_backend::error::{AppError, AppResult};
use sparkpic_backend::external::MessageTransport;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Fresh in-memory store with the full schema applied. A single connection
/// keeps every handle on the same database.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("failed to run migrations");
    db
}

pub async fn create_user(db: &DatabaseConnection, telegram_id: i64, credits: i64) -> users::Model {
    let now = Utc::now();
    create_user_full(db, telegram_id, credits, None, now, Some(now)).await
}

#[allow(dead_code)]
pub async fn create_user_full(
    db: &DatabaseConnection,
    telegram_id: i64,
    credits: i64,
    referred_by: Option<i64>,
    created_at: DateTime<Utc>,
    last_active_at: Option<DateTime<Utc>>,
) -> users::Model {
    users::ActiveModel {
        telegram_id: Set(telegram_id),
        username: Set(None),
        credits: Set(credits),
        total_spent: Set(0),
        referred_by: Set(referred_by),
        referral_credited: Set(false),
        acquisition_source: Set(None),
        created_at: Set(created_at),
        last_active_at: Set(last_active_at),
    }
    .insert(db)
    .await
    .expect("failed to insert user")
}

/// Records every delivered message; can be told to fail the next send.
#[derive(Default)]
pub struct FakeTransport {
    pub sent: Mutex<Vec<(i64, String)>>,
    fail_next: AtomicBool,
}

#[allow(dead_code)]
impl FakeTransport {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent_to(&self, chat_id: i64) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == chat_id)
            .count()
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageTransport for FakeTransport {
    async fn send_message(&self, chat_id: i64, text: &str) -> AppResult<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AppError::ExternalApiError("transport down".to_string()));
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}
