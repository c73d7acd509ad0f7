//! Console line classification.
//!
//! Turns one raw console line into at most one [`RelayEvent`]. Rules are
//! checked in order and the first match wins:
//!
//! 1. prefix recognition (unknown formats are dropped)
//! 2. exclusions (villager deaths, the dragon sentinel line)
//! 3. chat
//! 4. join/leave
//! 5. advancement
//! 6. death keyword
//! 7. server start
//! 8. server stop
//!
//! Classification never fails; lines it cannot interpret produce no event.

use tracing::trace;

use crate::common::messages::{EventKind, RelayEvent};

use super::keywords::KeywordSet;
use super::prefix::parse_line;

pub const ADVANCEMENT_EMOJI: &str = ":partying_face: ";
pub const DEATH_EMOJI: &str = ":skull: ";
pub const SERVER_STARTED_TEXT: &str = ":white_check_mark: Server has started";
pub const SERVER_STOPPING_TEXT: &str = ":x: Server is shutting down";

const JOIN_LEAVE_PHRASES: &[&str] = &["joined the game", "left the game"];

const ADVANCEMENT_PHRASES: &[&str] = &[
    "has made the advancement",
    "has completed the challenge",
    "has reached the goal",
];

/// Printed by the server on startup when the dragon fight is already over.
const DRAGON_SENTINEL: &str = "Found that the dragon has been killed in this world already.";

/// Classify one raw console line.
pub fn classify(raw: &str, bot_label: &str, keywords: &KeywordSet) -> Option<RelayEvent> {
    let line = parse_line(raw)?.body;

    if is_excluded(line) {
        trace!("Excluded console line: {}", line);
        return None;
    }

    if line.starts_with('<') {
        return classify_chat(line);
    }

    if contains_any(line, JOIN_LEAVE_PHRASES) {
        return Some(RelayEvent::new(EventKind::SystemJoinLeave, bot_label, line));
    }

    if contains_any(line, ADVANCEMENT_PHRASES) {
        return Some(RelayEvent::new(
            EventKind::Advancement,
            bot_label,
            format!("{}{}", ADVANCEMENT_EMOJI, line),
        ));
    }

    if keywords.find_in(line).is_some() {
        return Some(RelayEvent::new(
            EventKind::Death,
            bot_label,
            format!("{}{}", DEATH_EMOJI, line),
        ));
    }

    if line.starts_with("Done (") {
        return Some(RelayEvent::new(
            EventKind::ServerStart,
            bot_label,
            SERVER_STARTED_TEXT,
        ));
    }

    if line.starts_with("Stopping the server") {
        return Some(RelayEvent::new(
            EventKind::ServerStop,
            bot_label,
            SERVER_STOPPING_TEXT,
        ));
    }

    None
}

/// `<name> message` becomes a chat event from `name`.
///
/// Everything after the first space is the message, leading spaces included.
fn classify_chat(line: &str) -> Option<RelayEvent> {
    let (token, message) = line.split_once(' ')?;
    if message.is_empty() {
        return None;
    }

    let token = token.strip_prefix('<').unwrap_or(token);
    let speaker = token.strip_suffix('>').unwrap_or(token);

    Some(RelayEvent::new(EventKind::Chat, speaker, message))
}

fn is_excluded(line: &str) -> bool {
    let villager_death = line.starts_with("Villager") && line.contains("died, message");
    villager_death || line == DRAGON_SENTINEL
}

fn contains_any(line: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| line.contains(phrase))
}

/// Classifier bound to one bot label and keyword set.
#[derive(Debug, Clone)]
pub struct Classifier {
    bot_label: String,
    keywords: KeywordSet,
}

impl Classifier {
    pub fn new(bot_label: impl Into<String>, keywords: KeywordSet) -> Self {
        Self {
            bot_label: bot_label.into(),
            keywords,
        }
    }

    pub fn classify(&self, raw: &str) -> Option<RelayEvent> {
        classify(raw, &self.bot_label, &self.keywords)
    }

    pub fn bot_label(&self) -> &str {
        &self.bot_label
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }
}
