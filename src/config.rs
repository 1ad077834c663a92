use crate::chained_map::{DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, MAX_CAPACITY};
use crate::codegen::CODE_LENGTH;
use crate::error::{ConfigError, MapError};
use std::str::FromStr;

/// Default prefix of every short URL.
pub const DEFAULT_BASE_URL: &str = "https://myshorturl.ly/";

/// Consecutive code collisions tolerated by `shorten` before it gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Sizing of a `ChainedHashMap`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    /// Requested bucket count; rounded up to a power of two. Signed so that
    /// a negative request coming from configuration is rejected, not wrapped.
    pub initial_capacity: i64,
    /// Growth trigger: the map doubles once `len` reaches
    /// `floor(capacity * load_factor)` and another key arrives.
    pub load_factor: f64,
}

impl MapConfig {
    /// Check the configuration and return the bucket count it produces.
    pub fn validate(&self) -> Result<usize, MapError> {
        if self.initial_capacity < 0 {
            return Err(MapError::NegativeCapacity(self.initial_capacity));
        }
        if !self.load_factor.is_finite() || self.load_factor <= 0.0 {
            return Err(MapError::InvalidLoadFactor(self.load_factor));
        }
        let requested = usize::try_from(self.initial_capacity).unwrap_or(MAX_CAPACITY);
        Ok(table_size_for(requested))
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY as i64,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

/// Smallest power of two `>= requested`, with `0 -> 1`, clamped to
/// `MAX_CAPACITY`.
pub(crate) fn table_size_for(requested: usize) -> usize {
    requested
        .max(1)
        .checked_next_power_of_two()
        .map_or(MAX_CAPACITY, |n| n.min(MAX_CAPACITY))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShortenerConfig {
    /// Prefix of every short URL, e.g. "https://myshorturl.ly/".
    /// `from_env` normalizes it to end in exactly one slash.
    pub base_url: String,

    /// Symbols per short code.
    pub code_length: usize,

    /// Consecutive collisions allowed before `GenerationExhausted`.
    pub max_attempts: u32,

    /// Sizing shared by the code and URL tables.
    pub table: MapConfig,
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            code_length: CODE_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            table: MapConfig::default(),
        }
    }
}

impl ShortenerConfig {
    /// Load configuration from `CHAINLINK_*` environment variables. Unset
    /// variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = match lookup("CHAINLINK_BASE_URL") {
            Some(raw) => {
                let trimmed = raw.trim().trim_end_matches('/');
                if trimmed.is_empty() {
                    return Err(ConfigError::EmptyBaseUrl);
                }
                format!("{trimmed}/")
            }
            None => defaults.base_url,
        };

        let config = Self {
            base_url,
            code_length: parse_var(&lookup, "CHAINLINK_CODE_LENGTH", defaults.code_length)?,
            max_attempts: parse_var(&lookup, "CHAINLINK_MAX_ATTEMPTS", defaults.max_attempts)?,
            table: MapConfig {
                initial_capacity: parse_var(
                    &lookup,
                    "CHAINLINK_INITIAL_CAPACITY",
                    defaults.table.initial_capacity,
                )?,
                load_factor: parse_var(
                    &lookup,
                    "CHAINLINK_LOAD_FACTOR",
                    defaults.table.load_factor,
                )?,
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if self.code_length == 0 {
            return Err(ConfigError::ZeroCodeLength);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        self.table.validate()?;
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}
