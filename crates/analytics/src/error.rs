use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Invalid initial allocation: {0}")]
    InvalidAllocation(Decimal),

    #[error("An unexpected error occurred during analytics calculation: {0}")]
    InternalError(String),
}
