//! Advisor Runner: watchlist batches, saved recommendations, validation, research.
//!
//! This crate builds on `advisor-core` to provide:
//! - TOML advisor configuration with an embedded engine config and watchlist
//! - Parallel, per-asset isolated batch evaluation
//! - JSON persistence of recommendations per label, source and day
//! - Retroactive validation of saved recommendations
//! - Correlation and beta tables

pub mod backtest;
pub mod batch;
pub mod config;
pub mod research;
pub mod store;
pub mod watchlist;

pub use backtest::{validate_saved, ValidationOutcome};
pub use batch::{evaluate_entry, run_batch, AssetOutcome, BatchReport};
pub use config::{AdvisorConfig, ConfigError, DataConfig};
pub use research::{beta_table, correlation, BetaRow};
pub use store::{RecommendationStore, StoreError};
pub use watchlist::WatchlistEntry;
