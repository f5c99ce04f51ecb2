//! In-process publish/subscribe channel for one topic.
//!
//! Built on a `tokio` broadcast channel: every subscriber registered before a
//! publication receives that event exactly once, and a slow observer never
//! blocks the publisher. An observer that falls more than the channel capacity
//! behind loses the oldest events; [`Subscription::take_missed`] reports how
//! many so the view can reload the store instead.

use super::messages::{ChangeEvent, ChangeKind};
use crate::storage::DEFAULT_STORAGE_KEY;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};

/// Events buffered per subscriber before the oldest are dropped.
pub const DEFAULT_CAPACITY: usize = 64;

/// Cloneable handle to a single named change channel.
///
/// Clones share the same channel; pass one clone to the store and keep others
/// for the views that observe it.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    topic: Arc<str>,
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_KEY)
    }
}

impl ChangeNotifier {
    /// Creates a channel for `topic`.
    #[must_use]
    pub fn new(topic: impl AsRef<str>) -> Self {
        Self::with_capacity(topic, DEFAULT_CAPACITY)
    }

    /// Creates a channel buffering at most `capacity` events per subscriber.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn with_capacity(topic: impl AsRef<str>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            topic: Arc::from(topic.as_ref()),
            sender,
        }
    }

    /// The topic name this channel is keyed by.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Registers a new observer.
    ///
    /// Only events published after this call are delivered; observers should
    /// load the store explicitly right after subscribing.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        tracing::debug!(topic = %self.topic, "observer subscribed");
        Subscription {
            topic: Arc::clone(&self.topic),
            receiver: self.sender.subscribe(),
            missed: 0,
        }
    }

    /// Publishes one event to every live subscriber.
    ///
    /// Returns the number of subscribers the event was delivered to.
    pub fn publish(&self, kind: ChangeKind) -> usize {
        let event = ChangeEvent::new(self.topic.as_ref(), kind);
        self.publish_event(event)
    }

    /// Publishes a pre-built event, e.g. one received from another process.
    ///
    /// Events for a different topic are ignored.
    pub fn publish_event(&self, event: ChangeEvent) -> usize {
        if event.topic != *self.topic {
            tracing::warn!(expected = %self.topic, got = %event.topic, "ignoring event for foreign topic");
            return 0;
        }

        let cleared = event.kind.is_cleared();
        // No receivers is not an error: nobody is watching yet.
        let delivered = self.sender.send(event).unwrap_or(0);

        tracing::debug!(topic = %self.topic, cleared, delivered, "change published");
        delivered
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receiving end of a [`ChangeNotifier`] registration.
#[derive(Debug)]
pub struct Subscription {
    topic: Arc<str>,
    receiver: broadcast::Receiver<ChangeEvent>,
    missed: u64,
}

impl Subscription {
    /// Topic this subscription listens on.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns the next pending event without blocking.
    ///
    /// Events lost to lagging are skipped and counted; see
    /// [`Subscription::take_missed`].
    pub fn try_next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(topic = %self.topic, skipped, "observer lagged behind");
                    self.missed += skipped;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Returns every pending event in publication order.
    pub fn drain(&mut self) -> Vec<ChangeEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Number of events lost since the last call, resetting the count.
    ///
    /// Non-zero means the received events are incomplete and the store must be
    /// loaded again.
    pub fn take_missed(&mut self) -> u64 {
        std::mem::take(&mut self.missed)
    }
}
