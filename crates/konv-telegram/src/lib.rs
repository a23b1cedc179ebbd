//! # konv-telegram
//!
//! Telegram side of konvbot: the transport sink used by the fan-out engine
//! and the long-polling chat front end that drives `ConversationService`.

pub mod bot;
pub mod error;
pub mod handlers;
pub mod keyboard;
pub mod transport;

pub use bot::{build_bot, start_polling};
pub use error::{Error, Result};
pub use transport::TelegramTransport;
