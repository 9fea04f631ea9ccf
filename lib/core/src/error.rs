use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Invalid coordinate on dimension {dimension}: {value} is not finite")]
    InvalidCoordinate { dimension: String, value: f64 },

    #[error("Insufficient availability for product {product_id}: requested {requested}, available {available}")]
    InsufficientAvailability {
        product_id: String,
        requested: u32,
        available: u32,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
