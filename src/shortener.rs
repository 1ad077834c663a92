//! Shortener: the bidirectional URL-shortening service.
//!
//! 1. `shorten` consults the URL side of the index first, so repeated calls
//!    for one URL return the first short URL and change nothing.
//! 2. On a miss it derives a code from the URL's digest. If that code is
//!    taken by another URL it draws random codes until one is free or the
//!    collision budget runs out.
//! 3. Reads go through the code side only.
//!
//! All mutation takes `&mut self` and the type is `Send` but `!Sync`, so
//! callers get single-writer access from the borrow checker. Concurrent
//! callers serialize `shorten`, `expand` and `delete` behind their own lock.
//! The access counter is a plain increment for the same reason.

use crate::bi_index::{BiIndex, IndexStats};
use crate::codegen::{CodeGenerator, ContentDigest, Sha256Digest};
use crate::config::ShortenerConfig;
use crate::error::{ConfigError, ShortenError};
use crate::record::{LinkRecord, LinkStats};
use rand::rngs::StdRng;
use rand::Rng;

#[derive(Debug)]
pub struct Shortener<D = Sha256Digest, R = StdRng> {
    config: ShortenerConfig,
    index: BiIndex,
    generator: CodeGenerator<D, R>,
}

impl Shortener {
    /// Default configuration, SHA-256 codes, entropy-seeded fallback.
    pub fn new() -> Self {
        let config = ShortenerConfig::default();
        Self {
            generator: CodeGenerator::new().with_length(config.code_length),
            index: BiIndex::new(),
            config,
        }
    }

    pub fn with_config(config: ShortenerConfig) -> Result<Self, ConfigError> {
        Self::with_generator(config, CodeGenerator::new())
    }
}

impl Default for Shortener {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, R> Shortener<D, R>
where
    D: ContentDigest,
    R: Rng,
{
    /// Build with an explicit code generator (digest and random source).
    /// The generator's code length is taken from `config`.
    pub fn with_generator(
        config: ShortenerConfig,
        generator: CodeGenerator<D, R>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            index: BiIndex::from_config(&config.table)?,
            generator: generator.with_length(config.code_length),
            config,
        })
    }

    pub fn config(&self) -> &ShortenerConfig {
        &self.config
    }

    /// Short URL for `url`, creating the mapping on first use.
    pub fn shorten(&mut self, url: &str) -> Result<String, ShortenError> {
        if url.is_empty() {
            return Err(ShortenError::InvalidInput);
        }

        if let Some(code) = self.index.code_for(url) {
            tracing::debug!(code, "url already shortened");
            return Ok(self.short_url_for(code));
        }

        let mut candidate = self.generator.deterministic_code(url);
        let mut collisions = 0;
        let code = loop {
            match self.index.insert_pair(LinkRecord::new(url, candidate.as_str())) {
                Ok(()) => break candidate,
                Err(_) => {
                    collisions += 1;
                    tracing::debug!(code = %candidate, collisions, "short code taken");
                    if collisions >= self.config.max_attempts {
                        tracing::warn!(url, collisions, "short code generation exhausted");
                        return Err(ShortenError::GenerationExhausted {
                            attempts: collisions,
                        });
                    }
                    candidate = self.generator.random_code();
                }
            }
        };

        tracing::info!(code = %code, url, "created short link");
        Ok(self.short_url_for(&code))
    }

    /// Original URL behind `short_url`.
    ///
    /// A hit increments the link's access count: this read mutates.
    pub fn expand(&mut self, short_url: &str) -> Option<String> {
        let Some(code) = self.code_of(short_url) else {
            tracing::debug!(short_url, "foreign prefix");
            return None;
        };
        match self.index.record_access(code) {
            Some(record) => Some(record.original_url.clone()),
            None => {
                tracing::debug!(code, "unknown short code");
                None
            }
        }
    }

    /// Snapshot of the link behind `short_url`. Does not count as an access.
    pub fn statistics(&self, short_url: &str) -> Option<LinkStats> {
        let record = self.index.record(self.code_of(short_url)?)?;
        Some(LinkStats::from_record(
            record,
            self.short_url_for(&record.short_code),
        ))
    }

    /// Remove the link behind `short_url` from both directions. Returns
    /// whether it existed.
    pub fn delete(&mut self, short_url: &str) -> bool {
        let Some(code) = self.code_of(short_url) else {
            return false;
        };
        match self.index.remove_pair(code) {
            Some(record) => {
                tracing::info!(code, url = %record.original_url, "deleted short link");
                true
            }
            None => false,
        }
    }

    pub fn total_count(&self) -> usize {
        self.index.len()
    }

    pub fn short_url_for(&self, code: &str) -> String {
        format!("{}{}", self.config.base_url, code)
    }

    /// Chain diagnostics for the code and URL tables.
    pub fn table_statistics(&self) -> IndexStats {
        self.index.statistics()
    }

    fn code_of<'a>(&self, short_url: &'a str) -> Option<&'a str> {
        short_url.strip_prefix(self.config.base_url.as_str())
    }

    #[cfg(test)]
    pub(crate) fn index(&self) -> &BiIndex {
        &self.index
    }
}
