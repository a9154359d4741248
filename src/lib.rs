//! Freight cost calculator: prices sea + inland routes from a snapshot of validity-dated
//! rate tables and picks the cheapest agent.

pub mod domain;
pub mod infra;
pub mod ui;
pub mod util;

pub use domain::{calculate, calculate_at, CalculationRequest, CalculationResult, RateSnapshot};
pub use infra::snapshot_file::{load_snapshot, LoadedSnapshot, SnapshotLoadError};
