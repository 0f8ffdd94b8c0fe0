//! Follow-up detection.

use super::model::ApplicationRecord;
use chrono::{Days, NaiveDate};

/// Days without contact after which an open application needs a follow-up.
pub const DEFAULT_FOLLOW_UP_AFTER_DAYS: u32 = 7;

/// Last reference date that still counts as fresh.
///
/// A record needs a follow-up when its reference date is strictly before
/// this cutoff. `None` when the cutoff falls before the earliest
/// representable date, in which case nothing is stale.
pub fn follow_up_cutoff(today: NaiveDate, after_days: u32) -> Option<NaiveDate> {
    today.checked_sub_days(Days::new(u64::from(after_days)))
}

/// Whether a single record is stale.
///
/// Offers and rejections never need a follow-up. Any other record is stale
/// when its last contact (or, absent that, its submission) is strictly
/// earlier than `today - after_days`.
pub fn needs_follow_up(record: &ApplicationRecord, today: NaiveDate, after_days: u32) -> bool {
    if record.fields.status.is_terminal() {
        return false;
    }
    follow_up_cutoff(today, after_days).is_some_and(|cutoff| record.reference_date() < cutoff)
}

/// Filters `records` down to the ones needing a follow-up.
///
/// Pure; keeps the relative order of `records`.
pub fn needing_follow_up(
    records: &[ApplicationRecord],
    today: NaiveDate,
    after_days: u32,
) -> Vec<ApplicationRecord> {
    records
        .iter()
        .filter(|record| needs_follow_up(record, today, after_days))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::input::NewApplication;
    use crate::application::model::{ApplicationStatus, RecordId, RecordOrigin};
    use strum::IntoEnumIterator;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(id: &str, submitted: &str, status: ApplicationStatus) -> ApplicationRecord {
        let fields = NewApplication::new("Acme", "Intern")
            .with_submission_date(date(submitted))
            .with_status(status)
            .normalize(date(submitted));
        ApplicationRecord::new(RecordId::from(id), RecordOrigin::Local, fields)
    }

    #[test]
    fn test_eight_days_old_application_needs_follow_up() {
        let records = vec![record("a", "2024-01-01", ApplicationStatus::Applied)];
        let result = needing_follow_up(&records, date("2024-01-09"), 7);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id.as_str(), "a");
    }

    #[test]
    fn test_offer_never_needs_follow_up() {
        let records = vec![record("a", "2024-01-01", ApplicationStatus::Offer)];
        assert!(needing_follow_up(&records, date("2024-01-09"), 7).is_empty());
    }

    #[test]
    fn test_exactly_seven_days_is_not_stale() {
        let records = vec![record("a", "2024-01-02", ApplicationStatus::Applied)];
        assert!(needing_follow_up(&records, date("2024-01-09"), 7).is_empty());
    }

    #[test]
    fn test_last_contact_overrides_submission() {
        let mut r = record("a", "2023-12-01", ApplicationStatus::HrCall);
        r.fields.last_contact_date = Some(date("2024-01-08"));
        assert!(!needs_follow_up(&r, date("2024-01-09"), 7));

        r.fields.last_contact_date = Some(date("2023-12-31"));
        assert!(needs_follow_up(&r, date("2024-01-09"), 7));
    }

    #[test]
    fn test_every_status_against_the_rule() {
        let today = date("2024-06-30");
        for status in ApplicationStatus::iter() {
            let stale = record("s", "2024-06-01", status);
            let fresh = record("f", "2024-06-29", status);
            assert_eq!(needs_follow_up(&stale, today, 7), !status.is_terminal());
            assert!(!needs_follow_up(&fresh, today, 7));
        }
    }

    #[test]
    fn test_huge_threshold_marks_nothing_stale() {
        let records = vec![record("a", "2024-01-01", ApplicationStatus::Applied)];
        assert_eq!(follow_up_cutoff(date("2024-01-09"), u32::MAX), None);
        assert!(needing_follow_up(&records, date("2024-01-09"), u32::MAX).is_empty());
    }

    #[test]
    fn test_order_is_preserved() {
        let records = vec![
            record("c", "2024-01-03", ApplicationStatus::Technical),
            record("x", "2024-01-01", ApplicationStatus::Rejected),
            record("a", "2024-01-01", ApplicationStatus::NoResponse),
            record("b", "2024-01-02", ApplicationStatus::Applied),
        ];
        let ids: Vec<String> = needing_follow_up(&records, date("2024-02-01"), 7)
            .into_iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
