//! Domain entities - core business objects

mod channel;
mod pending_input;
mod user;

pub use channel::Channel;
pub use pending_input::PendingInput;
pub use user::User;
