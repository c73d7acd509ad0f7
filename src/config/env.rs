//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `DOLPHIN_RCON_HOST` - RCON server host
//! - `DOLPHIN_RCON_PORT` - RCON server port
//! - `DOLPHIN_RCON_PASSWORD` - RCON password
//! - `DOLPHIN_LOG_FILE` - Server console log path
//! - `DOLPHIN_BOT_LABEL` - Label for non-player events
//! - `DOLPHIN_CONFIG` - Config file path

use std::env;

use tracing::warn;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "DOLPHIN";

/// Config file used when `DOLPHIN_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "dolphin.conf";

fn var_name(suffix: &str) -> String {
    format!("{}_{}", ENV_PREFIX, suffix)
}

/// Apply environment variable overrides to a config.
///
/// This allows the RCON password to be kept out of the config file.
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_from(config, |name| env::var(name).ok())
}

/// Apply overrides read through `lookup`, keyed by full variable name.
pub fn apply_overrides_from(
    mut config: Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Config {
    // RCON connection
    if let Some(host) = lookup(&var_name("RCON_HOST")) {
        config.rcon.host = host;
    }
    if let Some(port) = lookup(&var_name("RCON_PORT")) {
        match port.parse() {
            Ok(port) => config.rcon.port = port,
            Err(_) => warn!(
                "Ignoring {}: '{}' is not a valid port",
                var_name("RCON_PORT"),
                port
            ),
        }
    }
    if let Some(password) = lookup(&var_name("RCON_PASSWORD")) {
        config.rcon.password = password;
    }

    // Console
    if let Some(log_file) = lookup(&var_name("LOG_FILE")) {
        config.console.log_file = log_file;
    }

    // Relay
    if let Some(label) = lookup(&var_name("BOT_LABEL")) {
        config.relay.bot_label = label;
    }

    config
}

/// Check if any sensitive environment variables are set but empty.
///
/// Returns a list of variable names that are set but empty.
pub fn check_empty_env_vars() -> Vec<String> {
    let vars = [var_name("RCON_PASSWORD"), var_name("LOG_FILE")];

    vars.into_iter()
        .filter(|var| env::var(var).map(|v| v.is_empty()).unwrap_or(false))
        .collect()
}

/// Get the config file path from environment or use default.
///
/// Checks `DOLPHIN_CONFIG` environment variable, otherwise returns "dolphin.conf".
pub fn get_config_path() -> String {
    env::var(var_name("CONFIG")).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;
    use std::collections::HashMap;

    fn make_test_config() -> Config {
        Config {
            rcon: RconConfig {
                host: "localhost".to_string(),
                port: 25575,
                password: "from_file".to_string(),
                connect_timeout_secs: 10,
            },
            console: ConsoleConfig {
                log_file: "/srv/logs/latest.log".to_string(),
                poll_interval_ms: 250,
                custom_death_keywords: Vec::new(),
            },
            relay: RelayConfig::default(),
        }
    }

    fn lookup_in(
        vars: HashMap<&'static str, &'static str>,
    ) -> impl Fn(&str) -> Option<String> {
        move |name: &str| vars.get(name).map(|v| v.to_string())
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(ENV_PREFIX, "DOLPHIN");
        assert_eq!(var_name("RCON_HOST"), "DOLPHIN_RCON_HOST");
    }

    #[test]
    fn test_no_overrides() {
        let result = apply_overrides_from(make_test_config(), |_| None);
        assert_eq!(result.rcon.password, "from_file");
        assert_eq!(result.rcon.host, "localhost");
    }

    #[test]
    fn test_all_overrides() {
        let vars = HashMap::from([
            ("DOLPHIN_RCON_HOST", "mc.example.net"),
            ("DOLPHIN_RCON_PORT", "25580"),
            ("DOLPHIN_RCON_PASSWORD", "from_env"),
            ("DOLPHIN_LOG_FILE", "/var/log/mc.log"),
            ("DOLPHIN_BOT_LABEL", "Relay"),
        ]);

        let result = apply_overrides_from(make_test_config(), lookup_in(vars));
        assert_eq!(result.rcon.host, "mc.example.net");
        assert_eq!(result.rcon.port, 25580);
        assert_eq!(result.rcon.password, "from_env");
        assert_eq!(result.console.log_file, "/var/log/mc.log");
        assert_eq!(result.relay.bot_label, "Relay");
    }

    #[test]
    fn test_bad_port_ignored() {
        let vars = HashMap::from([("DOLPHIN_RCON_PORT", "not-a-port")]);
        let result = apply_overrides_from(make_test_config(), lookup_in(vars));
        assert_eq!(result.rcon.port, 25575);
    }
}
