use core_types::FundCode;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommitmentError {
    /// The position references a fund that is not in the catalog.
    #[error("Unknown fund code: '{0}'")]
    UnknownFund(String),

    #[error("Invalid principal for position '{0}': {1}")]
    InvalidPrincipal(String, Decimal),

    #[error("Principal {principal} is below the {fund} minimum investment of {minimum}")]
    BelowMinimum {
        fund: FundCode,
        principal: Decimal,
        minimum: Decimal,
    },

    #[error("Date arithmetic out of range: {0}")]
    DateOverflow(String),
}

