use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// One row per checkout attempt. `paid` flips on confirmation, `notified`
/// after an abandoned-payment reminder; rows are never deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "pending_invoices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub package_id: String,
    pub paid: bool,
    pub notified: bool,
    pub sent_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
