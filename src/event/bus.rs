use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::debug;

use super::{events::MatchEvent, subscription::Subscription};

const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Event bus fanning committed match mutations out to live subscribers
#[derive(Debug, Clone)]
pub struct EventBus {
    /// Match-specific event channels: match_id -> sender
    match_channels: Arc<RwLock<HashMap<String, broadcast::Sender<MatchEvent>>>>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            match_channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Emits an event to all subscribers of its match, returning how many
    /// receivers got it. Matches nobody watches have no channel at all.
    pub fn emit(&self, event: MatchEvent) -> usize {
        let channels = self
            .match_channels
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        match channels.get(event.match_id()) {
            Some(sender) => {
                let match_id = event.match_id().to_string();
                match sender.send(event) {
                    Ok(receivers) => {
                        debug!(match_id = %match_id, receivers, "Match event emitted");
                        receivers
                    }
                    Err(_) => {
                        debug!(match_id = %match_id, "Match event emitted with no receivers");
                        0
                    }
                }
            }
            None => {
                debug!(match_id = %event.match_id(), "No subscribers for match event");
                0
            }
        }
    }

    /// Subscribe to events for a specific match. The returned handle
    /// releases its interest when dropped.
    pub fn subscribe(&self, match_id: &str) -> Subscription {
        let mut channels = self
            .match_channels
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let receiver = channels
            .entry(match_id.to_string())
            .or_insert_with(|| {
                debug!(match_id = %match_id, "Creating match channel for subscription");
                broadcast::channel(self.capacity).0
            })
            .subscribe();

        Subscription::new(match_id.to_string(), receiver, self.clone())
    }

    /// Drops the channel for a match once its last receiver is gone
    pub(crate) fn release(&self, match_id: &str) {
        let mut channels = self
            .match_channels
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(sender) = channels.get(match_id) {
            if sender.receiver_count() == 0 {
                channels.remove(match_id);
                debug!(match_id = %match_id, "Released idle match channel");
            }
        }
    }

    pub fn active_channels(&self) -> usize {
        self.match_channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
