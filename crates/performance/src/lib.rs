//! # Keystone Performance Analytics
//!
//! Layered aggregation of what the trading desk delivered: trade → manager → fund
//! (pool) → portfolio, plus the manager ranking.
//!
//! True P&L everywhere is `current equity + withdrawals − initial allocation`, so profit
//! that was already paid out still counts. The extracted-profit pool is part of total
//! P&L but never of client AUM or the blended client return.

pub mod error;
pub mod fund;
pub mod manager;
pub mod portfolio;
pub mod ranking;

pub use error::PerformanceError;
pub use fund::{FundPerformance, ManagerFailure};
pub use manager::{AccountTotals, ManagerPerformance};
pub use portfolio::{PerformanceAnalyzer, PortfolioPerformance};
pub use ranking::{ManagerRankings, rank_managers};
