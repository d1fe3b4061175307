//! forecast-diff: FiveThirtyEight vs. PredictIt state-level divergence.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod sources;
pub mod engine;
