//! # Keystone Trade Analytics
//!
//! This crate reduces the closed trades of a brokerage account into trading statistics
//! and risk-adjusted ratios. It is the "what did the trading actually produce" half of
//! the reconciliation.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `TradeAggregator` is a stateless calculator. It takes
//!   raw trade records as input and produces a `TradeStatistics` as output.
//! - **No Arithmetic Faults:** Every ratio with a possibly-zero denominator resolves to
//!   zero or `core_types::SENTINEL_RATIO`.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::TradeAggregator;
pub use error::AnalyticsError;
pub use report::TradeStatistics;
