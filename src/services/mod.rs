pub mod account_service;
pub mod engagement_job_service;
pub mod ledger_service;
pub mod notification_service;
pub mod promo_service;
pub mod stats_service;

pub use account_service::*;
pub use engagement_job_service::*;
pub use ledger_service::*;
pub use notification_service::*;
pub use promo_service::*;
pub use stats_service::*;
