//! Short-code generation: a content-derived code with a random fallback.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

/// Symbols a short code is drawn from.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Symbols per code unless configured otherwise.
pub const CODE_LENGTH: usize = 7;

/// Opaque content digest: `digest(bytes) -> fixed-length bytes`.
pub trait ContentDigest {
    fn digest(&self, content: &[u8]) -> Vec<u8>;
}

/// SHA-256 content digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digest;

impl ContentDigest for Sha256Digest {
    fn digest(&self, content: &[u8]) -> Vec<u8> {
        Sha256::digest(content).to_vec()
    }
}

/// Map one digest byte, read as signed, to an alphabet symbol.
fn symbol(byte: u8) -> char {
    let magnitude = (byte as i8).unsigned_abs() as usize;
    ALPHABET[magnitude % ALPHABET.len()] as char
}

/// Produces short codes. The random source is owned and injectable so a
/// seeded generator replays the same fallback codes.
#[derive(Debug, Clone)]
pub struct CodeGenerator<D = Sha256Digest, R = StdRng> {
    digest: D,
    rng: R,
    length: usize,
}

impl CodeGenerator {
    /// SHA-256 digest, entropy-seeded RNG.
    pub fn new() -> Self {
        Self::with_parts(Sha256Digest, StdRng::from_entropy())
    }

    /// SHA-256 digest with a reproducible RNG.
    pub fn seeded(seed: u64) -> Self {
        Self::with_parts(Sha256Digest, StdRng::seed_from_u64(seed))
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, R> CodeGenerator<D, R>
where
    D: ContentDigest,
    R: Rng,
{
    pub fn with_parts(digest: D, rng: R) -> Self {
        Self {
            digest,
            rng,
            length: CODE_LENGTH,
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Code derived from `content`: the same content always yields the same
    /// code, but distinct contents may share one since the digest is
    /// truncated. An empty digest falls back to `random_code`.
    pub fn deterministic_code(&mut self, content: &str) -> String {
        let digest = self.digest.digest(content.as_bytes());
        if digest.is_empty() {
            tracing::warn!("content digest returned no bytes, using a random code");
            return self.random_code();
        }
        (0..self.length)
            .map(|i| symbol(digest[i % digest.len()]))
            .collect()
    }

    /// `length` independent uniform draws from the alphabet.
    pub fn random_code(&mut self) -> String {
        let rng = &mut self.rng;
        (0..self.length)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}
