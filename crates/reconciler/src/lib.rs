//! # Keystone Gap Reconciler
//!
//! Compares the contractual value of a position with what its brokerage accounts
//! actually delivered (withdrawals plus current equity) and classifies the difference
//! into a risk level with a recommendation.
//!
//! A position that cannot be reconciled still produces a record, at risk level ERROR,
//! so that a batch over many positions never aborts on one of them.

pub mod error;
pub mod gap;

pub use error::ReconcileError;
pub use gap::{GapReconciler, PerformanceGap, error_gap, recommendation};
