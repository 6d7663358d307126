// Live fan-out of committed match mutations to interested sessions.

// Public API - what other modules can use
pub use bus::EventBus;
pub use events::MatchEvent;
pub use subscription::{Subscription, SubscriptionManager};

// Internal modules
mod bus;
mod events;
mod subscription;
