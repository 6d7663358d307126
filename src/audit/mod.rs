// Append-only record of every score and status mutation, kept for
// dispute resolution. Player statistics never read from here.

// Public API - what other modules can use
pub use models::{AuditEntry, AuditLog};
pub use trail::AuditTrail;

// Internal modules
mod models;
mod trail;
