//! All Telegram-specific functionality

pub mod chunking;
pub mod client;

pub use chunking::{TELEGRAM_MAX_MESSAGE_LEN, chunk_message};
pub use client::TelegramClient;
