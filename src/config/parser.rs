//! Configuration file parsing (HOCON format).

use std::path::Path;

use crate::common::error::ConfigError;
use crate::config::types::Config;
use hocon::HoconLoader;

/// Load configuration from a HOCON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::IoError {
            path: path.display().to_string(),
            message: "file not found".to_string(),
        });
    }

    HoconLoader::new()
        .load_file(path)
        .map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

/// Load configuration from a HOCON string.
#[cfg(test)]
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    HoconLoader::new()
        .load_str(content)
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
        rcon {
          password = "secret"
        }
        console {
          log_file = "/srv/minecraft/logs/latest.log"
        }
    "#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = load_config_str(MINIMAL).unwrap();

        assert_eq!(config.rcon.host, "localhost");
        assert_eq!(config.rcon.port, 25575);
        assert_eq!(config.rcon.password, "secret");
        assert_eq!(config.rcon.connect_timeout_secs, 10);
        assert_eq!(config.console.poll_interval_ms, 250);
        assert!(config.console.custom_death_keywords.is_empty());
        assert_eq!(config.relay.bot_label, "Dolphin");
        assert_eq!(config.relay.queue_capacity, 0);
        assert!(config.relay.messages.show_deaths);
    }

    #[test]
    fn test_full_config() {
        let content = r#"
            rcon {
              host = "mc.internal"
              port = 25580
              password = "hunter2"
              connect_timeout_secs = 3
            }
            console {
              log_file = "/tmp/latest.log"
              poll_interval_ms = 100
              custom_death_keywords = ["was eaten", "evaporated"]
            }
            relay {
              bot_label = "Server"
              command_template = "say <%username%> %message%"
              queue_capacity = 64
              messages {
                show_advancements = false
                show_deaths = true
                show_joins_and_leaves = false
              }
            }
        "#;

        let config = load_config_str(content).unwrap();
        assert_eq!(config.rcon.host, "mc.internal");
        assert_eq!(config.rcon.port, 25580);
        assert_eq!(config.rcon.connect_timeout_secs, 3);
        assert_eq!(
            config.console.custom_death_keywords,
            vec!["was eaten", "evaporated"]
        );
        assert_eq!(config.relay.bot_label, "Server");
        assert_eq!(config.relay.command_template, "say <%username%> %message%");
        assert_eq!(config.relay.queue_capacity, 64);
        assert!(!config.relay.messages.show_advancements);
        assert!(!config.relay.messages.show_joins_and_leaves);
    }

    #[test]
    fn test_missing_password_is_parse_error() {
        let content = r#"
            rcon { host = "localhost" }
            console { log_file = "/tmp/latest.log" }
        "#;
        let result = load_config_str(content);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dolphin.conf");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.console.log_file, "/srv/minecraft/logs/latest.log");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(dir.path().join("dolphin.conf"));
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }
}
