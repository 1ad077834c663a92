//! chainlink: a separate-chaining hash map and a bidirectional URL
//! shortener built on two of them.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a hash table written from first principles whose every
//!   invariant is checkable, and a service that composes two of them
//!   into one consistent bidirectional index.
//! - Layers:
//!   - ChainedHashMap<K, V, S>: buckets of singly linked chains over a
//!     slot arena; spread hashing, power-of-two indexing, doubling growth.
//!   - BiIndex: owns a code -> record table and a url -> code table and
//!     is their only writer (`insert_pair`/`remove_pair`).
//!   - Shortener<D, R>: public service; idempotent `shorten`, counting
//!     `expand`, `statistics`, `delete`, `total_count`.
//!   - CodeGenerator<D, R>: digest-derived codes with a seedable random
//!     fallback for collisions.
//!
//! Constraints
//! - Single writer: types are `Send` but `!Sync` (no locks, no atomics).
//!   Writers get exclusive access through `&mut self`; callers that share
//!   a `Shortener` across threads wrap it in their own lock.
//! - Each entry stores its spread `u64` hash; growth relinks by the stored
//!   hash and never calls `K: Hash` again.
//! - Keys are immutable post-insert. The map cannot detect a key whose
//!   hash or equality changed; such a key turns into a lookup miss.
//! - Not-found is `None`/`false`. Errors are reserved for invalid input,
//!   exhausted code generation and invalid configuration.
//!
//! Reentrancy policy
//! - Map methods that run `K: Hash`/`K: Eq` open a debug-only probe scope.
//!   Re-entering the same map from those impls panics in debug builds.
//!
//! Hashing and growth
//! - `spread(h) = h ^ (h >> 32)`; bucket = `spread & (capacity - 1)`.
//! - Default capacity 16, load factor 0.75, threshold
//!   `floor(capacity * load_factor)`. A new key arriving at
//!   `len >= threshold` doubles the table before it is linked in.
//!
//! Notes and non-goals
//! - No tree bins for long chains, no fail-fast iterators, no persistence.
//! - The library emits `tracing` events and never installs a subscriber.

pub mod bi_index;
pub mod chained_map;
#[cfg(test)]
mod chained_map_proptest;
pub mod codegen;
pub mod config;
mod error;
mod probe_guard;
pub mod record;
pub mod shortener;
mod stats;

// Public surface
pub use bi_index::{BiIndex, IndexStats};
pub use chained_map::ChainedHashMap;
pub use codegen::{CodeGenerator, ContentDigest, Sha256Digest};
pub use config::{MapConfig, ShortenerConfig};
pub use error::{ConfigError, MapError, ShortenError};
pub use record::{LinkRecord, LinkStats};
pub use shortener::Shortener;
pub use stats::TableStats;
