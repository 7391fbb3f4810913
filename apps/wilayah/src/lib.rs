//! wilayah core library.
//!
//! This crate exposes programmatic APIs for validating and synchronizing the
//! four-level administrative region datasets (provinces, regencies,
//! districts, villages), each published as CSV and JSON.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `loader`: Streaming CSV and JSON record loading with source positions.
//! - `coerce`: Cell/value coercion shared by both sync directions.
//! - `validate`: Id format, parent reference and prefix checks per level.
//! - `sync`: Freshness-driven regeneration of the stale representation.
//! - `models`: Hierarchy levels, diagnostics and report structs.
//! - `output`: Human/JSON printers for validate/sync.
//! - `error`: Loader, sync and config error types.
//! - `utils`: Supporting helpers.
pub mod cli;
pub mod coerce;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod output;
pub mod sync;
pub mod utils;
pub mod validate;

pub use sync::run_sync;
pub use validate::run_validation;
