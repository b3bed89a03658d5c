//! Outcome Store - append-only accumulation of chain outcomes
//!
//! Records are only ever appended. Every query is order-insensitive apart
//! from returning records in insertion order.

use std::collections::BTreeSet;

use super::OutcomeRecord;
use crate::distribution::{compute_distribution, Distribution};
use crate::Result;

/// In-memory store for outcome records.
#[derive(Debug, Default, Clone)]
pub struct OutcomeStore {
    records: Vec<OutcomeRecord>,
}

impl OutcomeStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Append one record.
    pub fn push(&mut self, record: OutcomeRecord) {
        self.records.push(record);
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[OutcomeRecord] {
        &self.records
    }

    /// Distinct condition labels, sorted.
    #[must_use]
    pub fn conditions(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(OutcomeRecord::condition)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Records produced under `condition`.
    pub fn for_condition<'a>(
        &'a self,
        condition: &'a str,
    ) -> impl Iterator<Item = &'a OutcomeRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| r.condition() == condition)
    }

    /// Records for one trial, ordered by chain index.
    #[must_use]
    pub fn for_trial(&self, trial_id: &str) -> Vec<&OutcomeRecord> {
        let mut records: Vec<_> = self
            .records
            .iter()
            .filter(|r| r.trial_id() == trial_id)
            .collect();
        records.sort_by_key(|r| r.chain_index());
        records
    }

    /// Response distribution over every record.
    ///
    /// # Errors
    ///
    /// Returns error if the store is empty.
    pub fn distribution(&self) -> Result<Distribution> {
        compute_distribution(&self.records)
    }

    /// Response distribution restricted to `condition`.
    ///
    /// # Errors
    ///
    /// Returns error if no record has that condition.
    pub fn distribution_for(&self, condition: &str) -> Result<Distribution> {
        compute_distribution(self.for_condition(condition))
    }
}

impl Extend<OutcomeRecord> for OutcomeStore {
    fn extend<T: IntoIterator<Item = OutcomeRecord>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}

impl From<Vec<OutcomeRecord>> for OutcomeStore {
    fn from(records: Vec<OutcomeRecord>) -> Self {
        Self { records }
    }
}
