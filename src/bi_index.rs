//! BiIndex: one bidirectional code <-> URL index over two chained maps.
//!
//! The forward table owns each `LinkRecord`; the reverse table maps the
//! record's URL back to its code. Only `insert_pair` and `remove_pair`
//! write, and each touches both tables or neither, so no caller can observe
//! a pair present on one side only.

use crate::chained_map::ChainedHashMap;
use crate::config::MapConfig;
use crate::error::MapError;
use crate::record::LinkRecord;
use crate::stats::TableStats;

/// Diagnostics for both sides of a `BiIndex`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexStats {
    pub by_code: TableStats,
    pub by_url: TableStats,
}

#[derive(Debug, Default)]
pub struct BiIndex {
    by_code: ChainedHashMap<String, LinkRecord>,
    by_url: ChainedHashMap<String, String>,
}

impl BiIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both tables sized from `config`.
    pub fn from_config(config: &MapConfig) -> Result<Self, MapError> {
        Ok(Self {
            by_code: ChainedHashMap::from_config(config)?,
            by_url: ChainedHashMap::from_config(config)?,
        })
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Store `record` under its code and its URL. If either is already
    /// indexed nothing is written and the record is handed back.
    pub fn insert_pair(&mut self, record: LinkRecord) -> Result<(), LinkRecord> {
        if self.by_code.contains_key(record.short_code.as_str())
            || self.by_url.contains_key(record.original_url.as_str())
        {
            return Err(record);
        }
        self.by_url
            .put(record.original_url.clone(), record.short_code.clone());
        self.by_code.put(record.short_code.clone(), record);
        debug_assert_eq!(self.by_code.len(), self.by_url.len());
        Ok(())
    }

    /// Remove the pair indexed by `code` from both tables.
    pub fn remove_pair(&mut self, code: &str) -> Option<LinkRecord> {
        let record = self.by_code.remove(code)?;
        let reverse = self.by_url.remove(record.original_url.as_str());
        debug_assert_eq!(reverse.as_deref(), Some(code));
        Some(record)
    }

    pub fn record(&self, code: &str) -> Option<&LinkRecord> {
        self.by_code.get(code)
    }

    /// Look up `code` and count the visit in place.
    pub fn record_access(&mut self, code: &str) -> Option<&LinkRecord> {
        let record = self.by_code.get_mut(code)?;
        record.record_access();
        Some(record)
    }

    pub fn code_for(&self, url: &str) -> Option<&str> {
        self.by_url.get(url).map(String::as_str)
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.by_url.contains_key(url)
    }

    pub fn records(&self) -> impl Iterator<Item = &LinkRecord> {
        self.by_code.values()
    }

    pub fn statistics(&self) -> IndexStats {
        IndexStats {
            by_code: self.by_code.statistics(),
            by_url: self.by_url.statistics(),
        }
    }

    /// Every forward entry has exactly one matching reverse entry.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.by_code.len(), self.by_url.len());
        for (code, record) in &self.by_code {
            assert_eq!(code, &record.short_code);
            assert_eq!(
                self.by_url.get(record.original_url.as_str()),
                Some(code),
                "reverse entry for {}",
                record.original_url
            );
        }
        self.by_code.assert_invariants();
        self.by_url.assert_invariants();
    }
}
