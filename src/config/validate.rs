//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::bridge::formatter::CommandFormatter;
use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // Validate RCON config
    if config.rcon.host.trim().is_empty() {
        errors.push("rcon.host is required".to_string());
    }
    if config.rcon.port == 0 {
        errors.push("rcon.port must be non-zero".to_string());
    }
    if config.rcon.password.is_empty() {
        errors.push("rcon.password is required".to_string());
    }
    if config.rcon.connect_timeout_secs == 0 {
        errors.push("rcon.connect_timeout_secs must be non-zero".to_string());
    }

    // Validate console config
    if config.console.log_file.trim().is_empty() {
        errors.push("console.log_file is required".to_string());
    }
    if config.console.poll_interval_ms == 0 {
        errors.push("console.poll_interval_ms must be non-zero".to_string());
    }
    for (i, keyword) in config.console.custom_death_keywords.iter().enumerate() {
        if keyword.is_empty() {
            errors.push(format!(
                "console.custom_death_keywords[{}] is empty and would match every line",
                i
            ));
        }
    }

    // Validate relay config
    if config.relay.bot_label.trim().is_empty() {
        errors.push("relay.bot_label is required".to_string());
    }
    if let Some(problem) = check_command_template(&config.relay.command_template) {
        errors.push(problem);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}

/// Check that the template carries the message and, if it embeds a JSON
/// text component, that the component stays valid after substitution.
fn check_command_template(template: &str) -> Option<String> {
    if !template.contains("%message%") {
        return Some("relay.command_template must contain %message%".to_string());
    }

    let formatter = CommandFormatter::new(template);
    let sample = formatter.format("Steve \"the\" \\ miner", "a \"quoted\" message");
    let json_start = sample.find(|c: char| c == '[' || c == '{')?;

    match serde_json::from_str::<serde_json::Value>(&sample[json_start..]) {
        Ok(_) => None,
        Err(e) => Some(format!(
            "relay.command_template does not produce valid JSON: {}",
            e
        )),
    }
}
