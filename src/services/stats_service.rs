use crate::entities::{
    generation_entity as generations, notification_log_entity as notification_log,
    purchase_entity as purchases, user_entity as users,
};
use crate::error::AppResult;
use crate::models::{EffectStat, NotificationStat, PackageStat, StatsResponse};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, QueryOrder, QuerySelect,
};

/// Read-only aggregates for the admin panel. No invariants live here.
#[derive(Clone)]
pub struct StatsService {
    pool: DatabaseConnection,
}

impl StatsService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        let total_users = users::Entity::find().count(&self.pool).await? as i64;
        let total_generations = generations::Entity::find().count(&self.pool).await? as i64;

        #[derive(Debug, FromQueryResult)]
        struct PurchaseTotalsRow {
            count: i64,
            revenue: Option<i64>,
        }
        let purchase_totals = purchases::Entity::find()
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .column_as(Expr::col(purchases::Column::PriceMinor).sum(), "revenue")
            .into_model::<PurchaseTotalsRow>()
            .one(&self.pool)
            .await?;

        #[derive(Debug, FromQueryResult)]
        struct EffectRow {
            effect_id: String,
            count: i64,
        }
        let effect_rows = generations::Entity::find()
            .select_only()
            .column(generations::Column::EffectId)
            .column_as(Expr::val(1).count(), "count")
            .group_by(generations::Column::EffectId)
            .into_model::<EffectRow>()
            .all(&self.pool)
            .await?;

        #[derive(Debug, FromQueryResult)]
        struct PackageRow {
            credits: i64,
            count: i64,
            revenue: Option<i64>,
        }
        let package_rows = purchases::Entity::find()
            .select_only()
            .column(purchases::Column::Credits)
            .column_as(Expr::val(1).count(), "count")
            .column_as(Expr::col(purchases::Column::PriceMinor).sum(), "revenue")
            .group_by(purchases::Column::Credits)
            .order_by_asc(purchases::Column::Credits)
            .into_model::<PackageRow>()
            .all(&self.pool)
            .await?;

        #[derive(Debug, FromQueryResult)]
        struct NotificationRow {
            notification_type: String,
            total_sent: i64,
            unique_users: i64,
        }
        let notification_rows = notification_log::Entity::find()
            .select_only()
            .column(notification_log::Column::NotificationType)
            .column_as(Expr::val(1).count(), "total_sent")
            .column_as(
                Expr::expr(Func::count_distinct(Expr::col(
                    notification_log::Column::UserId,
                ))),
                "unique_users",
            )
            .group_by(notification_log::Column::NotificationType)
            .into_model::<NotificationRow>()
            .all(&self.pool)
            .await?;

        Ok(StatsResponse {
            total_users,
            total_generations,
            total_purchases: purchase_totals.as_ref().map(|r| r.count).unwrap_or(0),
            total_revenue_minor: purchase_totals
                .as_ref()
                .and_then(|r| r.revenue)
                .unwrap_or(0),
            effect_stats: effect_rows
                .into_iter()
                .map(|r| EffectStat {
                    effect_id: r.effect_id,
                    count: r.count,
                })
                .collect(),
            package_stats: package_rows
                .into_iter()
                .map(|r| PackageStat {
                    credits: r.credits,
                    count: r.count,
                    revenue_minor: r.revenue.unwrap_or(0),
                })
                .collect(),
            notification_stats: notification_rows
                .into_iter()
                .map(|r| NotificationStat {
                    notification_type: r.notification_type,
                    total_sent: r.total_sent,
                    unique_users: r.unique_users,
                })
                .collect(),
        })
    }
}
