//! Background scheduled jobs.
//!
//! Two loops: the daily engagement batch (welcome reminders, re-engagement,
//! win-back) and a frequent sweep for abandoned invoices. Call `spawn_all`
//! once during startup to launch them.

use crate::services::EngagementJobService;

/// Spawn all background jobs.
///
/// Each job is idempotent: the dispatch engine's dedup and daily-cap guards
/// make a rerun a no-op, so an extra pass after a restart is harmless. This
/// function detaches the loops via `tokio::spawn`; it does not block.
pub fn spawn_all(job_service: EngagementJobService) {
    // Daily engagement batch.
    {
        let svc = job_service.clone();
        tokio::spawn(async move {
            loop {
                match svc.run_daily_batch().await {
                    Ok(n) if n > 0 => log::info!("Daily engagement batch sent {n} messages"),
                    Ok(_) => log::debug!("Daily engagement batch: nothing to send"),
                    Err(e) => log::error!("Daily engagement batch failed: {e:?}"),
                }
                tokio::time::sleep(std::time::Duration::from_secs(24 * 3600)).await;
            }
        });
    }

    // Abandoned-invoice sweep (every 30 minutes).
    {
        let svc = job_service.clone();
        tokio::spawn(async move {
            loop {
                match svc.send_abandoned_payment_reminders().await {
                    Ok(n) if n > 0 => log::info!("Abandoned-payment reminders sent: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Abandoned-payment sweep failed: {e:?}"),
                }
                tokio::time::sleep(std::time::Duration::from_secs(1800)).await;
            }
        });
    }
}
