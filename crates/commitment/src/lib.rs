//! # Keystone Commitment Calculator
//!
//! Computes what the platform owes an investor: the milestone timeline of a position,
//! its redemption eligibility, and the contractually expected value at a given instant.
//!
//! - `timeline`: milestone dates, the Incubating → InterestEligible → FullyRedeemable
//!   state machine, and redemption windows.
//! - `accrual`: simple-interest accrual on top of the timeline.
//!
//! Everything here is a pure function of the catalog, the position and an explicit
//! `as_of` timestamp.

pub mod accrual;
pub mod error;
pub mod timeline;

pub use accrual::{AccrualCalculator, ExpectedPerformance, validate_principal};
pub use error::CommitmentError;
pub use timeline::Timeline;
