//! Relay orchestrator that ties the server console and the chat side together.
//!
//! Console -> chat: one follow task reads the log, classifies each line and
//! queues the resulting events.
//!
//! Chat -> console: every message is turned into one or more commands, each
//! sent over its own short-lived RCON session.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::common::error::{RelayError, RelayResult, SessionStage};
use crate::common::messages::{ChatMessage, PlayerList};
use crate::config::types::{Config, MessagesConfig};
use crate::console::{Classifier, KeywordSet, LogFollower};
use crate::protocol::rcon::Connection;

use super::channels::{ChannelBundle, EventReceiver, FollowChannels, QueueMode};
use super::formatter::CommandFormatter;

/// Command that lists online players.
pub const LIST_COMMAND: &str = "minecraft:list";

/// Where and how to open RCON sessions.
#[derive(Debug, Clone)]
pub struct RconTarget {
    pub host: String,
    pub port: u16,
    pub password: String,
    pub connect_timeout: Duration,
}

impl RconTarget {
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.rcon.host.clone(),
            port: config.rcon.port,
            password: config.rcon.password.clone(),
            connect_timeout: config.rcon.connect_timeout(),
        }
    }
}

/// Sends chat messages and queries into the game.
///
/// Cheap to clone; every call opens its own connection, so calls may run
/// concurrently.
#[derive(Debug, Clone)]
pub struct CommandSender {
    target: Arc<RconTarget>,
    formatter: Arc<CommandFormatter>,
}

impl CommandSender {
    pub fn new(target: RconTarget, formatter: CommandFormatter) -> Self {
        Self {
            target: Arc::new(target),
            formatter: Arc::new(formatter),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            RconTarget::from_config(config),
            CommandFormatter::new(config.relay.command_template.clone()),
        )
    }

    /// Relay one chat message into the game.
    ///
    /// Commands go out in order, one session each. The first failure stops
    /// the rest of the message and is returned. Returns the number of
    /// commands sent.
    pub async fn send_chat(&self, message: &ChatMessage) -> RelayResult<usize> {
        let ChatMessage { sender, content } = message;
        let commands = self.formatter.build_commands(sender, content);
        if commands.is_empty() {
            debug!(sender = %sender, "Nothing to relay after formatting");
            return Ok(0);
        }

        for (i, command) in commands.iter().enumerate() {
            if let Err(e) = self.run_command(command).await {
                warn!(
                    sender = %sender,
                    "Chat -> console failed at part {}/{}: {}",
                    i + 1,
                    commands.len(),
                    e
                );
                return Err(e);
            }
        }

        info!(sender = %sender, parts = commands.len(), "Chat -> console");
        Ok(commands.len())
    }

    /// Ask the server who is online.
    pub async fn list_players(&self) -> RelayResult<PlayerList> {
        let reply = self.run_command(LIST_COMMAND).await?;
        PlayerList::parse(&reply).ok_or_else(|| RelayError::UnexpectedReply {
            command: LIST_COMMAND.to_string(),
            reply,
        })
    }

    /// Run one command in a fresh session and return its output.
    ///
    /// The connection is closed whether or not the exchange succeeds.
    pub async fn run_command(&self, command: &str) -> RelayResult<String> {
        let target = &self.target;

        let mut conn = Connection::connect(&target.host, target.port, target.connect_timeout)
            .await
            .map_err(RelayError::session(SessionStage::Connect))?;

        let result = exchange(&mut conn, &target.password, command).await;

        if let Err(e) = conn.close().await {
            debug!("Error closing RCON connection: {}", e);
        }

        result
    }
}

async fn exchange(conn: &mut Connection, password: &str, command: &str) -> RelayResult<String> {
    conn.authenticate(password)
        .await
        .map_err(RelayError::session(SessionStage::Authenticate))?;

    conn.send_command(command)
        .await
        .map_err(RelayError::session(SessionStage::Command))
}

/// The running relay.
pub struct Relay {
    log_path: String,
    shutdown_tx: watch::Sender<bool>,
    follow_task: JoinHandle<RelayResult<()>>,
    commands: CommandSender,
}

impl Relay {
    /// Open the console log and start following it.
    ///
    /// Returns the relay and the receiver the outward sender drains.
    pub async fn start(config: &Config) -> RelayResult<(Self, EventReceiver)> {
        let log_file = &config.console.log_file;
        let follower = LogFollower::open(log_file, config.console.poll_interval())
            .await
            .map_err(|source| RelayError::Follow {
                path: log_file.clone(),
                source,
            })?;

        let keywords = KeywordSet::new(&config.console.custom_death_keywords);
        let classifier = Classifier::new(config.relay.bot_label.clone(), keywords);

        Ok(Self::spawn(
            follower,
            classifier,
            config.relay.messages,
            QueueMode::from_capacity(config.relay.queue_capacity),
            CommandSender::from_config(config),
        ))
    }

    /// Start the follow task over an already-open follower.
    pub fn spawn(
        follower: LogFollower,
        classifier: Classifier,
        messages: MessagesConfig,
        mode: QueueMode,
        commands: CommandSender,
    ) -> (Self, EventReceiver) {
        let channels = ChannelBundle::new(mode);
        let log_path = follower.path().display().to_string();

        info!(
            bot_label = classifier.bot_label(),
            keywords = classifier.keywords().len(),
            ?mode,
            "Starting console relay"
        );

        let task = follow_console(follower, classifier, messages, channels.follow);
        let follow_task = tokio::spawn(task);

        let relay = Self {
            log_path,
            shutdown_tx: channels.control.shutdown_tx,
            follow_task,
            commands,
        };
        (relay, channels.events_rx)
    }

    /// Handle for sending chat into the game.
    pub fn commands(&self) -> CommandSender {
        self.commands.clone()
    }

    /// Stop following the log and wait for the follow task to end.
    ///
    /// A follow task that panicked or was cancelled is reported as
    /// [`RelayError::FollowTask`].
    pub async fn close(self) -> RelayResult<()> {
        // The task may already have stopped on its own
        let _ = self.shutdown_tx.send(true);

        match self.follow_task.await {
            Ok(result) => {
                info!("Console relay stopped");
                result
            }
            Err(source) => {
                error!("Follow task ended abnormally: {}", source);
                Err(RelayError::FollowTask {
                    path: self.log_path,
                    source,
                })
            }
        }
    }
}

/// Follow task body: read, classify, filter, queue.
async fn follow_console(
    mut follower: LogFollower,
    classifier: Classifier,
    messages: MessagesConfig,
    channels: FollowChannels,
) -> RelayResult<()> {
    let FollowChannels {
        events_tx,
        mut shutdown_rx,
    } = channels;

    loop {
        let line = tokio::select! {
            _ = shutdown_rx.changed() => break,
            line = follower.next_line() => line,
        };

        let line = line.map_err(|source| {
            error!("Failed to read console log: {}", source);
            RelayError::Follow {
                path: follower.path().display().to_string(),
                source,
            }
        })?;

        let Some(event) = classifier.classify(&line) else {
            continue;
        };

        if !messages.allows(event.kind) {
            debug!(
                kind = event.kind.name(),
                "Event disabled by message options"
            );
            continue;
        }

        debug!(kind = event.kind.name(), "Console -> chat: {}", event.text);

        tokio::select! {
            _ = shutdown_rx.changed() => break,
            sent = events_tx.send(event) => {
                if sent.is_err() {
                    warn!("Event receiver dropped, stopping console follower");
                    break;
                }
            }
        }
    }

    Ok(())
}
