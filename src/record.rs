use chrono::{DateTime, Utc};
use std::fmt;

/// One shortened link, owned by the code table of a `BiIndex`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub original_url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    /// Successful expansions so far.
    pub access_count: u64,
}

impl LinkRecord {
    pub fn new(original_url: impl Into<String>, short_code: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            short_code: short_code.into(),
            created_at: Utc::now(),
            access_count: 0,
        }
    }

    pub(crate) fn record_access(&mut self) {
        self.access_count = self.access_count.saturating_add(1);
    }
}

/// Point-in-time view of a link returned by `Shortener::statistics`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStats {
    pub original_url: String,
    pub short_url: String,
    pub created_at: DateTime<Utc>,
    pub access_count: u64,
}

impl LinkStats {
    pub(crate) fn from_record(record: &LinkRecord, short_url: String) -> Self {
        Self {
            original_url: record.original_url.clone(),
            short_url,
            created_at: record.created_at,
            access_count: record.access_count,
        }
    }

    /// Whole minutes since the link was created.
    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.created_at).num_minutes()
    }
}

impl fmt::Display for LinkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Original: {}", self.original_url)?;
        writeln!(f, "Short: {}", self.short_url)?;
        writeln!(f, "Age: {} minutes", self.age_minutes())?;
        write!(f, "Clicks: {}", self.access_count)
    }
}
