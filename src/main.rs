//! Dolphin - Minecraft console <-> chat relay
//!
//! Follows a Minecraft server's console log, turns interesting lines into
//! chat events, and relays chat messages back into the game over RCON.
//!
//! This binary stands in for the chat platform: events are written to the
//! log, and each stdin line (`name: message`, or `!list`) is relayed into
//! the game.

mod bridge;
mod common;
mod config;
mod console;
mod protocol;

use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{error, info, warn};

use bridge::{CommandSender, EventReceiver, Relay};
use common::{AppError, ChatMessage};
use config::env::{check_empty_env_vars, get_config_path};
use config::load_and_validate;

/// stdin command that asks the server for its player list.
const LIST_TRIGGER: &str = "!list";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Dolphin v{} starting...", env!("CARGO_PKG_VERSION"));

    for var in check_empty_env_vars() {
        warn!("{} is set but empty and overrides the config file", var);
    }

    // Load configuration and start the relay
    let config_path = get_config_path();
    let (relay, events) = match start_relay(&config_path).await {
        Ok(started) => started,
        Err(e) => {
            error!("Failed to start: {}", e);
            if matches!(e, AppError::Config(_)) {
                error!(
                    "Please ensure {} exists and is properly formatted.",
                    config_path
                );
            }
            return Err(e.into());
        }
    };

    let event_printer = tokio::spawn(print_events(events));
    let chat_reader = tokio::spawn(read_chat(relay.commands()));

    shutdown_signal().await;
    info!("Shutting down...");

    chat_reader.abort();

    if let Err(e) = relay.close().await {
        error!("Console relay ended with an error: {}", e);
    }

    // The printer finishes once the queue is drained
    match tokio::time::timeout(Duration::from_secs(5), event_printer).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Event printer task panicked: {}", e),
        Err(_) => warn!("Timed out draining relay events"),
    }

    info!("Exiting...");
    Ok(())
}

/// Load and validate the config, then start following the console.
async fn start_relay(config_path: &str) -> common::error::Result<(Relay, EventReceiver)> {
    info!("Loading configuration from {}...", config_path);
    let config = load_and_validate(config_path)?;

    info!("Configuration loaded successfully");
    info!("  RCON: {}:{}", config.rcon.host, config.rcon.port);
    info!("  Console log: {}", config.console.log_file);
    info!("  Bot label: {}", config.relay.bot_label);

    Ok(Relay::start(&config).await?)
}

/// Outward sender: show each event the way it would appear in chat.
async fn print_events(mut events: EventReceiver) {
    while let Some(event) = events.recv().await {
        let kind = event.kind.name();
        info!(kind, "**{}**: {}", event.origin_label, event.text);
    }
    info!("Console -> chat forwarding ended");
}

/// Inbound side: one task per stdin line.
async fn read_chat(commands: CommandSender) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line == LIST_TRIGGER {
            let commands = commands.clone();
            tokio::spawn(async move {
                match commands.list_players().await {
                    Ok(list) => info!(
                        "{} of {} players online: {}",
                        list.online,
                        list.max,
                        list.players.join(", ")
                    ),
                    Err(e) => warn!("Player list failed: {}", e.user_message()),
                }
            });
            continue;
        }

        let Some((sender, content)) = line.split_once(": ") else {
            warn!("Expected 'name: message' or '{}', got '{}'", LIST_TRIGGER, line);
            continue;
        };

        let message = ChatMessage::new(sender.trim(), content);
        let commands = commands.clone();
        tokio::spawn(async move {
            if let Err(e) = commands.send_chat(&message).await {
                let reason = e.user_message();
                warn!("Could not deliver message from {}: {}", message.sender, reason);
            }
        });
    }

    info!("stdin closed, no more chat input");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
