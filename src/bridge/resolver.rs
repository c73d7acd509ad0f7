//! Emoji resolution for chat text bound for the game.
//!
//! The game font has no emoji glyphs, so Unicode emoji are rewritten to
//! their `:shortcode:` form before being sent.

use emojis::Emoji;

/// Longest emoji sequence we try to match, in chars (ZWJ families, flags).
const MAX_EMOJI_CHARS: usize = 8;

/// Convert Unicode emojis to text aliases (e.g., 😀 -> :grinning:).
///
/// Uses the shortcode when one exists, otherwise the emoji's name. The
/// longest matching sequence wins, so modifiers and ZWJ joins are consumed
/// with their base emoji.
pub fn resolve_unicode_emojis_to_text(message: &str) -> String {
    let mut result = String::with_capacity(message.len());
    let mut rest = message;

    while let Some(ch) = rest.chars().next() {
        if ch.is_ascii() {
            result.push(ch);
            rest = &rest[1..];
            continue;
        }

        match longest_emoji(rest) {
            Some((emoji, len)) => {
                result.push(':');
                result.push_str(emoji.shortcode().unwrap_or_else(|| emoji.name()));
                result.push(':');
                rest = &rest[len..];
            }
            None => {
                result.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    result
}

/// Longest emoji at the start of `text`, with its byte length.
fn longest_emoji(text: &str) -> Option<(&'static Emoji, usize)> {
    let ends: Vec<usize> = text
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take(MAX_EMOJI_CHARS)
        .collect();

    ends.into_iter()
        .rev()
        .find_map(|end| emojis::get(&text[..end]).map(|emoji| (emoji, end)))
}
