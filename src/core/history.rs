use std::collections::VecDeque;

use crate::calculation::Calculation;

/// Ordered calculation records, oldest first, never longer than `max_size`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStore {
    records: VecDeque<Calculation>,
    max_size: usize,
}

impl HistoryStore {
    /// Empty store holding at most `max_size` records (minimum one).
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            records: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
        }
    }

    /// Appends `record`, evicting the oldest entry when full.
    ///
    /// Returns the evicted record, if any.
    pub fn append(&mut self, record: Calculation) -> Option<Calculation> {
        let evicted = if self.records.len() >= self.max_size {
            self.records.pop_front()
        } else {
            None
        };
        self.records.push_back(record);
        evicted
    }

    /// Drops every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Owned copy of the records in chronological order.
    pub fn as_sequence(&self) -> Vec<Calculation> {
        self.records.iter().cloned().collect()
    }

    /// Swaps in `records` wholesale, keeping only the newest `max_size`.
    pub fn replace(&mut self, records: Vec<Calculation>) {
        let skip = records.len().saturating_sub(self.max_size);
        self.records = records.into_iter().skip(skip).collect();
    }

    /// Contiguous view of the records, oldest first.
    pub fn as_slice(&mut self) -> &[Calculation] {
        self.records.make_contiguous()
    }

    /// Records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Calculation> {
        self.records.iter()
    }

    /// Newest record.
    pub fn last(&self) -> Option<&Calculation> {
        self.records.back()
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records are held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Capacity before eviction starts.
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}
