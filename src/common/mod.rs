//! Common types shared across the application.

pub mod error;
pub mod messages;

pub use error::AppError;
pub use messages::ChatMessage;
