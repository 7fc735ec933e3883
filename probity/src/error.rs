//! Error types for arbitrary construction and value generation.

use thiserror::Error;

/// Errors raised while configuring arbitraries or generating values from them.
///
/// Every variant is a configuration problem. Running out of shrink candidates or
/// hitting a shrink budget is never an error, and neither is a discarded
/// candidate during shrinking.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArbitraryError {
    /// A probability argument was outside `[0.0, 1.0]`
    #[error("Invalid probability {probability} (must be within [0.0, 1.0])")]
    InvalidProbability { probability: f64 },

    /// A size or length argument was rejected
    #[error("Invalid size: {message}")]
    InvalidSize { message: String },

    /// Creator discovery returned nothing usable for the target type
    #[error("No creators found for type {target}")]
    NoCreatorsFound { target: String },

    /// Sub-arbitrary resolution returned no candidate for a creator parameter
    #[error("Cannot find arbitrary for parameter of type {parameter} in creator {creator}")]
    CannotFindArbitrary { parameter: String, creator: String },

    /// A creator was invoked with arguments it could not accept
    #[error("Creator {creator} rejected its arguments: {message}")]
    CreatorInvocationFailed { creator: String, message: String },

    /// A weighted choice was configured without any selectable entry
    #[error("Cannot choose from an empty set: {context}")]
    EmptyChoices { context: String },

    /// A filter rejected too many consecutive values
    #[error("Filter rejected {misses} values in a row")]
    TooManyFilterMisses { misses: usize },

    /// A configuration value failed validation
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: String,
        field: Option<String>,
    },
}

impl ArbitraryError {
    /// Create a configuration error naming the offending field
    pub fn config_error_with_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an invalid-size error
    pub fn invalid_size(message: impl Into<String>) -> Self {
        Self::InvalidSize {
            message: message.into(),
        }
    }

    /// Create an empty-choices error
    pub fn empty_choices(context: impl Into<String>) -> Self {
        Self::EmptyChoices {
            context: context.into(),
        }
    }

    /// Check a probability argument, returning it unchanged when it is valid
    pub fn check_probability(probability: f64) -> Result<f64> {
        if (0.0..=1.0).contains(&probability) {
            Ok(probability)
        } else {
            Err(Self::InvalidProbability { probability })
        }
    }
}

/// Result type for arbitrary construction and generation
pub type Result<T> = std::result::Result<T, ArbitraryError>;
