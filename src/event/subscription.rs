use std::collections::HashMap;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use super::{bus::EventBus, events::MatchEvent};

/// Live feed of one match's events.
///
/// Releasing happens in `Drop`, so a handle going out of scope on any path
/// (early return, `?`, panic unwinding) gives its channel back to the bus.
#[derive(Debug)]
pub struct Subscription {
    match_id: String,
    receiver: Option<broadcast::Receiver<MatchEvent>>,
    bus: EventBus,
}

impl Subscription {
    pub(super) fn new(
        match_id: String,
        receiver: broadcast::Receiver<MatchEvent>,
        bus: EventBus,
    ) -> Self {
        Self {
            match_id,
            receiver: Some(receiver),
            bus,
        }
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    /// Waits for the next event. Returns `None` once the channel is closed.
    /// Events missed because the subscriber fell behind are skipped.
    pub async fn recv(&mut self) -> Option<MatchEvent> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(match_id = %self.match_id, skipped, "Subscriber lagged behind");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`Subscription::recv`]
    pub fn try_recv(&mut self) -> Option<MatchEvent> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Receiver must go first so the bus sees the reduced count.
        self.receiver.take();
        self.bus.release(&self.match_id);
        debug!(match_id = %self.match_id, "Subscription released");
    }
}

/// Owns the live subscriptions of one client session.
///
/// Dropping the manager releases every subscription it holds.
#[derive(Debug)]
pub struct SubscriptionManager {
    session_id: String,
    bus: EventBus,
    subscriptions: HashMap<String, Subscription>,
}

impl SubscriptionManager {
    pub fn new(session_id: impl Into<String>, bus: EventBus) -> Self {
        Self {
            session_id: session_id.into(),
            bus,
            subscriptions: HashMap::new(),
        }
    }

    /// Subscribes to a match, reusing the existing handle if already watching
    pub fn subscribe(&mut self, match_id: &str) -> &mut Subscription {
        let bus = &self.bus;
        self.subscriptions
            .entry(match_id.to_string())
            .or_insert_with(|| bus.subscribe(match_id))
    }

    pub fn get_mut(&mut self, match_id: &str) -> Option<&mut Subscription> {
        self.subscriptions.get_mut(match_id)
    }

    /// Returns false if the session was not watching the match
    pub fn unsubscribe(&mut self, match_id: &str) -> bool {
        self.subscriptions.remove(match_id).is_some()
    }

    pub fn watched_matches(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.subscriptions.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        debug!(
            session_id = %self.session_id,
            released = self.subscriptions.len(),
            "Releasing session subscriptions"
        );
        self.subscriptions.clear();
    }
}
