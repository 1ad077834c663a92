//! Error types for the map, the service and configuration loading.
//!
//! Not-found is never an error: lookups return `Option`/`bool`.

use thiserror::Error;

/// Construction-time failures of `ChainedHashMap`.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MapError {
    #[error("illegal initial capacity: {0}")]
    NegativeCapacity(i64),
    #[error("illegal load factor: {0} (must be finite and > 0)")]
    InvalidLoadFactor(f64),
}

/// Failures of `Shortener::shorten`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortenError {
    #[error("URL cannot be empty")]
    InvalidInput,
    /// Every candidate code was taken. Retry later or widen the code space
    /// (`ShortenerConfig::code_length`).
    #[error("failed to generate a unique short code after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },
}

/// Failures while building or loading configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
    #[error("base URL must not be empty")]
    EmptyBaseUrl,
    #[error("short code length must be at least 1")]
    ZeroCodeLength,
    #[error("max attempts must be at least 1")]
    ZeroAttempts,
    #[error(transparent)]
    Table(#[from] MapError),
}
