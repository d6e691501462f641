pub mod account;
pub mod admin;
pub mod generation;
pub mod health;
pub mod ledger;
pub mod payment;
pub mod promo;

pub use account::account_config;
pub use admin::admin_config;
pub use generation::generation_config;
pub use health::health_config;
pub use ledger::ledger_config;
pub use payment::payment_config;
pub use promo::promo_config;
