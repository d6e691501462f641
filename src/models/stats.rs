use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct EffectStat {
    pub effect_id: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct PackageStat {
    pub credits: i64,
    pub count: i64,
    pub revenue_minor: i64,
}

#[derive(Debug, Serialize)]
pub struct NotificationStat {
    pub notification_type: String,
    pub total_sent: i64,
    pub unique_users: i64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_users: i64,
    pub total_generations: i64,
    pub total_purchases: i64,
    pub total_revenue_minor: i64,
    pub effect_stats: Vec<EffectStat>,
    pub package_stats: Vec<PackageStat>,
    pub notification_stats: Vec<NotificationStat>,
}
