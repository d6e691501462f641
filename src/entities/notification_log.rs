use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Append-only delivery log. A row is written only after the transport
/// confirmed the send, so a failed send stays retryable.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "notification_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub notification_type: String,
    pub sent_at: DateTime<Utc>,
    pub opened: bool,
    pub clicked: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
