//! Configuration type definitions.

use std::time::Duration;

use serde::Deserialize;

use crate::bridge::formatter::DEFAULT_COMMAND_TEMPLATE;
use crate::common::messages::EventKind;
use crate::console::follower::DEFAULT_POLL_INTERVAL;
use crate::protocol::rcon::connector::DEFAULT_CONNECT_TIMEOUT;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub rcon: RconConfig,
    pub console: ConsoleConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

/// RCON server connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RconConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub password: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl RconConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Server console log settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Path to the server's `latest.log`.
    pub log_file: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Extra death message substrings, added to the built-in list.
    #[serde(default)]
    pub custom_death_keywords: Vec<String>,
}

impl ConsoleConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Relay behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Origin label for events that do not come from a player.
    #[serde(default = "default_bot_label")]
    pub bot_label: String,
    /// Command with `%username%` and `%message%` placeholders.
    #[serde(default = "default_command_template")]
    pub command_template: String,
    /// Event queue capacity; 0 means unbounded.
    #[serde(default)]
    pub queue_capacity: usize,
    #[serde(default)]
    pub messages: MessagesConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bot_label: default_bot_label(),
            command_template: default_command_template(),
            queue_capacity: 0,
            messages: MessagesConfig::default(),
        }
    }
}

/// Which optional event kinds are relayed. Chat and server start/stop
/// are always relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MessagesConfig {
    #[serde(default = "default_true")]
    pub show_advancements: bool,
    #[serde(default = "default_true")]
    pub show_deaths: bool,
    #[serde(default = "default_true")]
    pub show_joins_and_leaves: bool,
}

impl MessagesConfig {
    pub fn allows(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Advancement => self.show_advancements,
            EventKind::Death => self.show_deaths,
            EventKind::SystemJoinLeave => self.show_joins_and_leaves,
            EventKind::Chat | EventKind::ServerStart | EventKind::ServerStop => true,
        }
    }
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            show_advancements: true,
            show_deaths: true,
            show_joins_and_leaves: true,
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    25575
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT.as_secs()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_bot_label() -> String {
    "Dolphin".to_string()
}

fn default_command_template() -> String {
    DEFAULT_COMMAND_TEMPLATE.to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_options() {
        let options = MessagesConfig {
            show_advancements: false,
            show_deaths: true,
            show_joins_and_leaves: false,
        };

        assert!(!options.allows(EventKind::Advancement));
        assert!(options.allows(EventKind::Death));
        assert!(!options.allows(EventKind::SystemJoinLeave));
        assert!(options.allows(EventKind::Chat));
        assert!(options.allows(EventKind::ServerStart));
        assert!(options.allows(EventKind::ServerStop));
    }

    #[test]
    fn test_relay_defaults() {
        let relay = RelayConfig::default();
        assert_eq!(relay.bot_label, "Dolphin");
        assert_eq!(relay.queue_capacity, 0);
        assert!(relay.command_template.contains("%message%"));
        assert_eq!(relay.messages, MessagesConfig::default());
    }

    #[test]
    fn test_timing_defaults() {
        assert_eq!(default_connect_timeout_secs(), 10);
        assert_eq!(default_poll_interval_ms(), 250);
    }
}
