//! # Keystone Core Types
//!
//! Layer 0 vocabulary shared by every other crate: fund identifiers, snapshot records
//! handed in by the outer layers, and the classification enums produced by the engine.

pub mod enums;
pub mod error;
pub mod structs;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// Re-export the core types to provide a clean public API.
pub use enums::{ActionPriority, EligibilityState, FundCode, PoolId, RiskLevel};
pub use error::CoreError;
pub use structs::{BrokerageAccountSnapshot, FundProduct, ManagerProfile, Position, TradeRecord};

/// Reported in place of a ratio whose denominator is zero because nothing bad happened:
/// no losing trades (profit factor), no negative returns (Sortino), or no drawdown
/// alongside a positive return (Calmar).
pub const SENTINEL_RATIO: Decimal = dec!(999.99);

/// Average days per month, used for the fractional part of elapsed months.
pub const AVERAGE_MONTH_DAYS: Decimal = dec!(30.44);
