pub mod telegram;

pub use telegram::{MessageTransport, TelegramTransport};
