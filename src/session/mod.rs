// Public API - what other modules can use
pub use context::{ActorContext, ACTOR_HEADER, SESSION_HEADER};

// Internal modules
mod context;
