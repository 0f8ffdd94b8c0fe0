//! Summary views over a record list.

use super::follow_up::needs_follow_up;
use super::model::{ApplicationRecord, ApplicationStatus};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

/// Dashboard totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStats {
    pub total: usize,
    /// Applied, HR call or technical.
    pub in_progress: usize,
    pub offers: usize,
    pub rejected: usize,
    pub needs_follow_up: usize,
}

impl ApplicationStats {
    pub fn compute(records: &[ApplicationRecord], today: NaiveDate, after_days: u32) -> Self {
        records.iter().fold(Self::default(), |mut stats, record| {
            let status = record.fields.status;
            stats.total += 1;
            if status.is_in_progress() {
                stats.in_progress += 1;
            }
            match status {
                ApplicationStatus::Offer => stats.offers += 1,
                ApplicationStatus::Rejected => stats.rejected += 1,
                _ => {}
            }
            if needs_follow_up(record, today, after_days) {
                stats.needs_follow_up += 1;
            }
            stats
        })
    }
}

/// Number of records per status, plus the overall count.
///
/// Every status is present, zero when unused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub all: usize,
    pub by_status: BTreeMap<ApplicationStatus, usize>,
}

impl StatusCounts {
    pub fn compute(records: &[ApplicationRecord]) -> Self {
        let mut by_status: BTreeMap<ApplicationStatus, usize> =
            ApplicationStatus::iter().map(|status| (status, 0)).collect();
        for record in records {
            *by_status.entry(record.fields.status).or_default() += 1;
        }
        Self {
            all: records.len(),
            by_status,
        }
    }

    pub fn get(&self, status: ApplicationStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Records matching `status`, or all of them for `None`. Order is kept.
pub fn filter_by_status(
    records: &[ApplicationRecord],
    status: Option<ApplicationStatus>,
) -> Vec<ApplicationRecord> {
    records
        .iter()
        .filter(|record| status.is_none_or(|s| record.fields.status == s))
        .cloned()
        .collect()
}
