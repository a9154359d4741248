//! Validity report over a whole snapshot: which rates have lapsed, which lapse soon.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;

use super::entities::{RateId, RateTable};
use super::snapshot::RateSnapshot;
use super::validity::ValidityStatus;
use crate::util::dates::iso_date;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidityEntry {
    pub table: RateTable,
    pub record_id: RateId,
    pub version: u32,
    #[serde(with = "iso_date")]
    pub valid_from: Date,
    #[serde(with = "iso_date")]
    pub valid_to: Date,
    pub status: ValidityStatus,
    /// Days left for active records that lapse within the horizon.
    pub days_remaining: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidityReport {
    #[serde(with = "iso_date")]
    pub reference_date: Date,
    pub expiring_within_days: u32,
    pub entries: Vec<ValidityEntry>,
    pub counts: BTreeMap<ValidityStatus, usize>,
}

impl ValidityReport {
    pub fn count(&self, status: ValidityStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn expiring_soon(&self) -> impl Iterator<Item = &ValidityEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.status == ValidityStatus::Active)
    }

    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Classifies every record of the snapshot on `reference_date`. The report keeps records
/// that are not active, plus active ones whose window closes within `expiring_within_days`.
pub fn audit_snapshot(
    snapshot: &RateSnapshot,
    reference_date: Date,
    expiring_within_days: u32,
) -> ValidityReport {
    let mut counts = BTreeMap::new();
    let mut entries = Vec::new();

    for record in snapshot.records() {
        let validity = record.validity();
        let status = validity.status_on(reference_date);
        *counts.entry(status).or_insert(0) += 1;

        let days_remaining = validity
            .days_remaining(reference_date)
            .filter(|days| *days <= i64::from(expiring_within_days));
        if status == ValidityStatus::Active && days_remaining.is_none() {
            continue;
        }

        entries.push(ValidityEntry {
            table: record.table(),
            record_id: record.id().to_string(),
            version: record.version(),
            valid_from: validity.valid_from,
            valid_to: validity.valid_to,
            status,
            days_remaining,
        });
    }

    entries.sort_by(|a, b| {
        a.table
            .cmp(&b.table)
            .then(a.valid_to.cmp(&b.valid_to))
            .then_with(|| a.record_id.cmp(&b.record_id))
    });

    ValidityReport {
        reference_date,
        expiring_within_days,
        entries,
        counts,
    }
}
