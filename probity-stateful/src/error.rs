//! Error types for chain generation.

use probity::ArbitraryError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    /// No transformer provider was registered, or none has a positive weight
    #[error("Chain needs at least one transformer provider with a positive frequency")]
    EmptyProviderSet,

    /// A chain length was configured outside its valid range
    #[error("Invalid chain size: {message}")]
    InvalidSize { message: String },

    #[error(transparent)]
    Arbitrary(#[from] ArbitraryError),
}

pub type Result<T> = std::result::Result<T, ChainError>;
