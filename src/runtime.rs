//! Runtime for executing turns
//!
//! The orchestrator owns the I/O; every decision is made by the pure
//! transition function in [`crate::state_machine`].

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{TurnOrchestrator, TurnOutcome};
pub use traits::*;

/// Type alias for the production orchestrator with concrete implementations
pub type ProductionOrchestrator = TurnOrchestrator<ServiceClient, TokioSleeper>;
