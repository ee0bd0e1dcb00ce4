use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Unknown fund code: '{0}'")]
    UnknownFund(String),

    #[error("Unknown pool: '{0}'")]
    UnknownPool(String),

    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),
}
