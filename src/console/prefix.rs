//! Console line prefix recognition.
//!
//! Server console lines start with a timestamp and a thread tag:
//!
//! ```text
//! [12:34:56] [Server thread/INFO]: <Steve> hello
//! [12:34:56] [Async Chat Thread - #3/INFO]: <Steve> hello
//! ```
//!
//! The second form is written by server implementations that handle chat
//! off the main thread.

use std::sync::LazyLock;

use fancy_regex::Regex;

/// Length of the shortest prefix we recognize: `[00:00:00] [Server thread/INFO]: `.
pub const MIN_PREFIX_LEN: usize = 33;

static PREFIX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[(\d{2}:\d{2}:\d{2})\] \[(?:Server thread|Async Chat Thread - #(\d+))/([A-Z]+)\]: ",
    )
    .expect("console prefix pattern is valid")
});

/// Thread that wrote a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadTag {
    Server,
    AsyncChat(u32),
}

/// A console line split into its prefix fields and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine<'a> {
    pub timestamp: &'a str,
    pub thread: ThreadTag,
    pub level: &'a str,
    /// Text after the prefix, surrounding whitespace trimmed.
    pub body: &'a str,
}

/// Split a raw console line into prefix and body.
///
/// Returns `None` for anything that does not carry one of the known
/// prefixes; such lines are not errors, just not ours.
pub fn parse_line(raw: &str) -> Option<ConsoleLine<'_>> {
    if raw.len() < MIN_PREFIX_LEN || !raw.starts_with('[') {
        return None;
    }

    let captures = PREFIX_PATTERN.captures(raw).ok()??;
    let whole = captures.get(0)?;

    let thread = match captures.get(2) {
        Some(number) => ThreadTag::AsyncChat(number.as_str().parse().ok()?),
        None => ThreadTag::Server,
    };

    Some(ConsoleLine {
        timestamp: captures.get(1)?.as_str(),
        thread,
        level: captures.get(3)?.as_str(),
        body: raw[whole.end()..].trim(),
    })
}
