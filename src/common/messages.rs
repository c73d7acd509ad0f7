//! Canonical message types for relay communication.
//!
//! This module defines the types that cross the boundary between the
//! relay core and the external chat collaborator.

/// Kind of a classified console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A player chat line.
    Chat,
    /// A player joined or left the game.
    SystemJoinLeave,
    /// Advancement, challenge or goal reached.
    Advancement,
    /// A player death.
    Death,
    /// The server finished starting.
    ServerStart,
    /// The server is stopping.
    ServerStop,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::SystemJoinLeave => "join_leave",
            Self::Advancement => "advancement",
            Self::Death => "death",
            Self::ServerStart => "server_start",
            Self::ServerStop => "server_stop",
        }
    }
}

/// Event produced from one console line, bound for the chat platform.
///
/// Events carry no identity: two identical lines produce two equal events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEvent {
    /// Who the message appears to come from (player name or the bot label).
    pub origin_label: String,
    /// Message content.
    pub text: String,
    /// What kind of line produced this event.
    pub kind: EventKind,
}

impl RelayEvent {
    pub fn new(kind: EventKind, origin_label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            origin_label: origin_label.into(),
            text: text.into(),
            kind,
        }
    }
}

/// Message from the chat platform to be relayed into the game.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Sender's display name.
    pub sender: String,
    /// Message content.
    pub content: String,
}

impl ChatMessage {
    pub fn new(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
        }
    }
}

/// Online players as reported by the server's `list` command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerList {
    pub online: u32,
    pub max: u32,
    pub players: Vec<String>,
}

impl PlayerList {
    /// Parse the reply to `minecraft:list`.
    ///
    /// The reply looks like
    /// `There are 2 of a max of 20 players online: Steve, Alex`.
    /// The first two integers before the colon are the online and max
    /// counts; the names follow the colon. Returns `None` when the reply
    /// does not carry both counts.
    pub fn parse(reply: &str) -> Option<Self> {
        let (summary, names) = match reply.split_once(':') {
            Some((summary, names)) => (summary, names),
            None => (reply, ""),
        };

        let mut numbers = summary
            .split_whitespace()
            .filter_map(|word| word.parse::<u32>().ok());
        let online = numbers.next()?;
        let max = numbers.next()?;

        let players = names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();

        Some(Self {
            online,
            max,
            players,
        })
    }
}
