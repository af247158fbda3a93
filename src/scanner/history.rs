//! Bounded history of completed scans

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Where a code came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanSource {
    /// Decoded from a scanner burst
    Scanner,
    /// Typed into the manual entry field
    Manual,
}

impl ScanSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scanner => "scanner",
            Self::Manual => "manual",
        }
    }
}

/// A single completed scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub code: String,
    pub source: ScanSource,
    /// Local time of the scan, RFC 3339
    pub scanned_at: String,
}

impl ScanRecord {
    pub fn new(code: impl Into<String>, source: ScanSource) -> Self {
        Self::at(code, source, Local::now())
    }

    pub fn at(code: impl Into<String>, source: ScanSource, when: DateTime<Local>) -> Self {
        Self {
            code: code.into(),
            source,
            scanned_at: when.to_rfc3339(),
        }
    }
}

/// Most recent scans, newest first, capped at `capacity`
#[derive(Debug, Clone)]
pub struct ScanHistory {
    records: VecDeque<ScanRecord>,
    capacity: usize,
    total: u64,
}

impl ScanHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
            total: 0,
        }
    }

    pub fn push(&mut self, record: ScanRecord) {
        self.records.push_front(record);
        self.records.truncate(self.capacity);
        self.total += 1;
    }

    pub fn latest(&self) -> Option<&ScanRecord> {
        self.records.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScanRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Scans recorded since creation or the last clear, including evicted ones
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.total = 0;
    }
}

impl Default for ScanHistory {
    fn default() -> Self {
        Self::new(100)
    }
}
