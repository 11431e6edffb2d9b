//! In-memory collaborators for tests and the keeper simulation
//!
//! Minimal stand-ins for the external price feeds and token ledgers the engine
//! talks to. They use interior mutability so a test can keep a handle next to
//! the engine and move prices or flip failure switches between operations.

pub mod feed;
pub mod token;

pub use feed::*;
pub use token::*;
