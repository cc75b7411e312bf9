//! SPINWISE: Roulette dozens/halves analysis and bankroll simulation engine.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod strategy;
pub mod engine;
pub mod backtest;
