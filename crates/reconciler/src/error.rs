use commitment::CommitmentError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconcileError {
    #[error("No brokerage account is linked to position '{0}'")]
    AccountNotFound(String),

    #[error("Expected performance unavailable: {0}")]
    Commitment(#[from] CommitmentError),
}
