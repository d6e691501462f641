pub mod account;
pub mod generation;
pub mod ledger;
pub mod notification;
pub mod payment;
pub mod promo;
pub mod stats;

pub use account::*;
pub use generation::*;
pub use ledger::*;
pub use notification::*;
pub use payment::*;
pub use promo::*;
pub use stats::*;
