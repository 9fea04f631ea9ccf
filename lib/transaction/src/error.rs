use dimx_core::TransactionStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TransactionError>;

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Transaction not found: {0}")]
    NotFound(String),

    #[error("Transaction {id} is {status}, only pending transactions can be processed")]
    NotPending { id: String, status: TransactionStatus },

    #[error("Transaction {0} is already being processed")]
    AlreadyProcessing(String),

    #[error("Proof error: {0}")]
    Proof(String),

    #[error(transparent)]
    Core(#[from] dimx_core::Error),
}
