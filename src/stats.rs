//! Read-only chain diagnostics for `ChainedHashMap`.

use core::fmt;

/// Snapshot of bucket usage taken by `ChainedHashMap::statistics`.
///
/// Owned and detached from the map, so it stays valid across later writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStats {
    pub capacity: usize,
    pub size: usize,
    /// Buckets whose chain holds at least one entry.
    pub used_buckets: usize,
    /// Mean chain length over used buckets; `0.0` when the map is empty.
    pub average_chain_length: f64,
    pub max_chain_length: usize,
    /// `size / capacity` right now, not the configured growth factor.
    pub load_factor: f64,
}

impl TableStats {
    pub(crate) fn from_chains(
        capacity: usize,
        chain_lengths: impl IntoIterator<Item = usize>,
    ) -> Self {
        let mut used_buckets = 0;
        let mut size = 0;
        let mut max_chain_length = 0;
        for len in chain_lengths.into_iter().filter(|&len| len > 0) {
            used_buckets += 1;
            size += len;
            max_chain_length = max_chain_length.max(len);
        }
        let average_chain_length = if used_buckets > 0 {
            size as f64 / used_buckets as f64
        } else {
            0.0
        };
        Self {
            capacity,
            size,
            used_buckets,
            average_chain_length,
            max_chain_length,
            load_factor: size as f64 / capacity as f64,
        }
    }

    /// Percentage of buckets holding a chain.
    pub fn bucket_utilization(&self) -> f64 {
        self.used_buckets as f64 / self.capacity as f64 * 100.0
    }
}

impl fmt::Display for TableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Capacity: {}, Size: {}, Load Factor: {:.2}",
            self.capacity, self.size, self.load_factor
        )?;
        writeln!(
            f,
            "Used Buckets: {}/{} ({:.2}%)",
            self.used_buckets,
            self.capacity,
            self.bucket_utilization()
        )?;
        write!(
            f,
            "Avg Chain Length: {:.2}, Max Chain Length: {}",
            self.average_chain_length, self.max_chain_length
        )
    }
}
