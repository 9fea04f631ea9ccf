use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Search index not initialized: call update_index first")]
    NotInitialized,

    #[error("Product not indexed: {0}")]
    ProductNotIndexed(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}
