pub mod code_generator;

pub use code_generator::{generate_promo_code, normalize_promo_code, PROMO_PREFIX};
