//! Relay channel management.
//!
//! Provides the event queue between the console follower and the outward
//! sender, plus the shutdown channel for the follow task.

use tokio::sync::{mpsc, watch};

use crate::common::messages::RelayEvent;

/// How the event queue buffers events the consumer has not taken yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueMode {
    /// No limit. A stalled consumer lets events pile up in memory.
    Unbounded,
    /// At most N queued events; the follower waits for space when full.
    Bounded(usize),
}

impl QueueMode {
    /// `0` selects unbounded, anything else a bounded queue of that size.
    pub fn from_capacity(capacity: usize) -> Self {
        if capacity == 0 {
            Self::Unbounded
        } else {
            Self::Bounded(capacity)
        }
    }
}

/// Producer side of the event queue.
#[derive(Debug, Clone)]
pub enum EventSender {
    Unbounded(mpsc::UnboundedSender<RelayEvent>),
    Bounded(mpsc::Sender<RelayEvent>),
}

impl EventSender {
    /// Queue one event, waiting for space if the queue is bounded and full.
    ///
    /// Hands the event back if the receiver is gone.
    pub async fn send(&self, event: RelayEvent) -> Result<(), RelayEvent> {
        match self {
            Self::Unbounded(tx) => tx.send(event).map_err(|e| e.0),
            Self::Bounded(tx) => tx.send(event).await.map_err(|e| e.0),
        }
    }
}

/// Consumer side of the event queue.
#[derive(Debug)]
pub enum EventReceiver {
    Unbounded(mpsc::UnboundedReceiver<RelayEvent>),
    Bounded(mpsc::Receiver<RelayEvent>),
}

impl EventReceiver {
    /// Next event in console order, or `None` once the follower has stopped
    /// and the queue is drained.
    pub async fn recv(&mut self) -> Option<RelayEvent> {
        match self {
            Self::Unbounded(rx) => rx.recv().await,
            Self::Bounded(rx) => rx.recv().await,
        }
    }
}

/// Create an event queue in the given mode.
pub fn event_queue(mode: QueueMode) -> (EventSender, EventReceiver) {
    match mode {
        QueueMode::Unbounded => {
            let (tx, rx) = mpsc::unbounded_channel();
            (EventSender::Unbounded(tx), EventReceiver::Unbounded(rx))
        }
        QueueMode::Bounded(capacity) => {
            let (tx, rx) = mpsc::channel(capacity);
            (EventSender::Bounded(tx), EventReceiver::Bounded(rx))
        }
    }
}

/// Channels for the follow task.
pub struct FollowChannels {
    /// Sender for console -> chat events.
    pub events_tx: EventSender,
    /// Receiver for shutdown signal (follow task listens).
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Control channels for shutdown coordination.
pub struct ControlChannels {
    /// Sender to trigger shutdown.
    pub shutdown_tx: watch::Sender<bool>,
}

/// Bundle of all channels created by the relay.
pub struct ChannelBundle {
    /// Channels for the follow task.
    pub follow: FollowChannels,
    /// Receiver for console -> chat events (outward sender listens).
    pub events_rx: EventReceiver,
    /// Control channels for shutdown.
    pub control: ControlChannels,
}

impl ChannelBundle {
    pub fn new(mode: QueueMode) -> Self {
        let (events_tx, events_rx) = event_queue(mode);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            follow: FollowChannels {
                events_tx,
                shutdown_rx,
            },
            events_rx,
            control: ControlChannels { shutdown_tx },
        }
    }
}
