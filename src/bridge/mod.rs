//! Relay between the server console and the chat platform.
//!
//! ## Module Structure
//!
//! - `channels`: Event queue and shutdown channels
//! - `formatter`: Chat message -> console command formatting
//! - `orchestrator`: Follow task and outbound sessions (`Relay`, `CommandSender`)
//! - `resolver`: Emoji rewriting for game text

pub mod channels;
pub mod formatter;
pub mod orchestrator;
pub mod resolver;

pub use channels::EventReceiver;
pub use orchestrator::{CommandSender, Relay};
