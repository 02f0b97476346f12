//! Typed refresh notifications between views.
//!
//! After a verdict the treasury ledger and the threat analytics are stale.
//! Whoever produced the verdict publishes the affected [`RefreshTopic`]s on a
//! [`RefreshBus`]; each view that renders that data holds a
//! [`RefreshSubscription`] and re-fetches when its topic arrives.

use std::fmt;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, warn};

const DEFAULT_CAPACITY: usize = 16;

/// Dataset that changed on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RefreshTopic {
    /// Transactions and wallet balance.
    Treasury,
    /// Threat network statistics.
    ThreatAnalytics,
}

impl RefreshTopic {
    pub const ALL: [RefreshTopic; 2] = [RefreshTopic::Treasury, RefreshTopic::ThreatAnalytics];
}

impl fmt::Display for RefreshTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshTopic::Treasury => f.write_str("treasury"),
            RefreshTopic::ThreatAnalytics => f.write_str("threat-analytics"),
        }
    }
}

/// Publish side of the refresh channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RefreshBus {
    sender: broadcast::Sender<RefreshTopic>,
}

impl Default for RefreshBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl RefreshBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Notify every current subscriber. Returns how many were reached.
    ///
    /// Publishing with no subscribers is not an error; nobody is showing the data.
    pub fn publish(&self, topic: RefreshTopic) -> usize {
        match self.sender.send(topic) {
            Ok(receivers) => {
                debug!(topic = %topic, receivers, "Published refresh");
                receivers
            }
            Err(_) => {
                debug!(topic = %topic, "Refresh published with no subscribers");
                0
            }
        }
    }

    /// Receive topics published from now on.
    pub fn subscribe(&self) -> RefreshSubscription {
        RefreshSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receive side of the refresh channel.
#[derive(Debug)]
pub struct RefreshSubscription {
    receiver: broadcast::Receiver<RefreshTopic>,
}

impl RefreshSubscription {
    /// Wait for the next batch of topics.
    ///
    /// Returns `None` once every [`RefreshBus`] handle is dropped. A lagging
    /// subscriber missed some notifications and is told to refresh everything.
    pub async fn recv(&mut self) -> Option<Vec<RefreshTopic>> {
        match self.receiver.recv().await {
            Ok(topic) => {
                let mut topics = vec![topic];
                topics.extend(self.drain());
                topics.sort();
                topics.dedup();
                Some(topics)
            }
            Err(RecvError::Lagged(missed)) => {
                warn!(missed, "Refresh subscriber lagged, refreshing everything");
                self.drain();
                Some(RefreshTopic::ALL.to_vec())
            }
            Err(RecvError::Closed) => None,
        }
    }

    /// Take every topic already queued, deduplicated, without waiting.
    pub fn drain(&mut self) -> Vec<RefreshTopic> {
        let mut topics = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(topic) => topics.push(topic),
                Err(TryRecvError::Lagged(missed)) => {
                    warn!(missed, "Refresh subscriber lagged, refreshing everything");
                    topics.extend(RefreshTopic::ALL);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        topics.sort();
        topics.dedup();
        topics
    }
}
