use std::collections::HashMap;
use std::fmt;

use crate::models::CanonicalArticleRecord;

/// Grouping key of a deposit batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchKey {
    pub volume: String,
    pub issue: String,
}

impl BatchKey {
    pub fn of(record: &CanonicalArticleRecord) -> Self {
        Self {
            volume: record.article.volume.clone(),
            issue: record.article.issue.clone(),
        }
    }
}

impl fmt::Display for BatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.volume, self.issue)
    }
}

/// Records sharing one (volume, issue), in insertion order.
#[derive(Debug, Clone)]
pub struct Batch {
    pub key: BatchKey,
    pub records: Vec<CanonicalArticleRecord>,
}

impl Batch {
    fn new(key: BatchKey) -> Self {
        Self {
            key,
            records: Vec::new(),
        }
    }

    /// The record whose journal and issue metadata heads the deposit document.
    pub fn first(&self) -> Option<&CanonicalArticleRecord> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Run-scoped grouping of records into batches. Keys are global across input files.
#[derive(Debug, Default)]
pub struct BatchGrouper {
    batches: Vec<Batch>,
    index: HashMap<BatchKey, usize>,
}

impl BatchGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the batch of its (volume, issue), creating the batch on first sight.
    pub fn add(&mut self, record: CanonicalArticleRecord) {
        let key = BatchKey::of(&record);
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.batches.push(Batch::new(key.clone()));
                let slot = self.batches.len() - 1;
                self.index.insert(key, slot);
                slot
            }
        };
        self.batches[slot].records.push(record);
    }

    pub fn get(&self, key: &BatchKey) -> Option<&Batch> {
        self.index.get(key).map(|&slot| &self.batches[slot])
    }

    /// Batches in the order their keys were first seen.
    pub fn iter(&self) -> impl Iterator<Item = &Batch> {
        self.batches.iter()
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.batches.iter().map(Batch::len).sum()
    }
}
