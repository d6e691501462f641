pub mod generations;
pub mod notification_log;
pub mod pending_invoices;
pub mod promo_codes;
pub mod promo_redemptions;
pub mod purchases;
pub mod users;

pub use generations as generation_entity;
pub use notification_log as notification_log_entity;
pub use pending_invoices as pending_invoice_entity;
pub use promo_codes as promo_code_entity;
pub use promo_redemptions as promo_redemption_entity;
pub use purchases as purchase_entity;
pub use users as user_entity;

pub use generations::GenerationStatus;
