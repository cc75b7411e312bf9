//! Backtesting: replay recorded spins and measure each scenario.

pub mod metrics;
pub mod runner;
