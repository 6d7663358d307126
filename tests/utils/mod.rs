pub mod actions;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use actions::{complete_match, start_match};
#[allow(unused_imports)]
pub use mocks::{DuplicatingMatchRepository, FailingStatsRepository, FlakyMatchRepository};
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
