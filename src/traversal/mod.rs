//! Four-level catalog traversal
//!
//! This module contains the harvest loop and the session helpers around it:
//! - `Orchestrator`, which walks Category → Section → Group → Component
//! - `login` and `authenticate`, which establish the signed-in session
//! - `HarvestStats`, the summary logged at the end of a run

mod orchestrator;
mod session;
mod stats;

pub use orchestrator::Orchestrator;
pub use session::{authenticate, login, LOGIN_POLL};
pub use stats::HarvestStats;
