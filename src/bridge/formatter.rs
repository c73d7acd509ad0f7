//! Outbound command formatting.
//!
//! Handles placeholder substitution in the command template.
//! Supports placeholders: %username%, %message%

use super::resolver::resolve_unicode_emojis_to_text;

/// Default command used to show a chat message to every player.
pub const DEFAULT_COMMAND_TEMPLATE: &str =
    r#"tellraw @a [{"color": "white", "text": "<%username%> %message%"}]"#;

/// Longest message piece sent in one command, in characters.
pub const MAX_CHUNK_CHARS: usize = 100;

/// Formatter that turns chat messages into console commands.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    /// Template with `%username%` and `%message%` placeholders.
    template: String,
}

impl CommandFormatter {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Substitute one message piece into the template.
    ///
    /// Both values are escaped for a JSON string literal, since the
    /// default template embeds them in a JSON text component.
    pub fn format(&self, username: &str, message: &str) -> String {
        self.template
            .replace("%username%", &escape_json(username))
            .replace("%message%", &escape_json(message))
    }

    /// Build every command needed to relay `content` from `username`.
    ///
    /// Emoji become shortcodes, each line is sent on its own, empty lines
    /// are skipped, and long lines are cut into [`MAX_CHUNK_CHARS`] pieces.
    pub fn build_commands(&self, username: &str, content: &str) -> Vec<String> {
        let content = resolve_unicode_emojis_to_text(content);
        let username = resolve_unicode_emojis_to_text(username);

        content
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .flat_map(|line| split_chunks(line, MAX_CHUNK_CHARS))
            .map(|chunk| self.format(&username, &chunk))
            .collect()
    }
}

impl Default for CommandFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TEMPLATE)
    }
}

/// Escape `\` and `"` so the value can sit inside a JSON string.
pub fn escape_json(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == '\\' || ch == '"' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Split `text` into consecutive pieces of at most `max_chars` characters.
///
/// Counts chars, not bytes, so multi-byte text is never cut mid-character.
/// Returns no pieces for empty text.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
