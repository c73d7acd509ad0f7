//! RCON remote-console client.

pub mod client;
pub mod connector;

pub use client::Connection;
