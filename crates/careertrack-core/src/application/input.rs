//! Inputs for creating and editing applications.

use super::model::{ApplicationFields, ApplicationSource, ApplicationStatus};
use crate::error::{Result, TrackerError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Longest company or position name accepted.
pub const MAX_NAME_LEN: usize = 100;

/// A record to be created. The store assigns the id.
///
/// `submission_date` and `status` may be left out; they default to the current
/// date and `applied` when the record is normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub submission_date: Option<NaiveDate>,
    #[serde(default)]
    pub source: ApplicationSource,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub recruiter_name: Option<String>,
    #[serde(default)]
    pub recruiter_email: Option<String>,
    #[serde(default)]
    pub recruiter_phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub last_contact_date: Option<NaiveDate>,
    #[serde(default)]
    pub next_follow_up: Option<NaiveDate>,
}

impl NewApplication {
    pub fn new(company: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            position: position.into(),
            ..Self::default()
        }
    }

    pub fn with_submission_date(mut self, date: NaiveDate) -> Self {
        self.submission_date = Some(date);
        self
    }

    pub fn with_status(mut self, status: ApplicationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_source(mut self, source: ApplicationSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_last_contact_date(mut self, date: NaiveDate) -> Self {
        self.last_contact_date = Some(date);
        self
    }

    /// Checks the fields a user can get wrong.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Validation` for a blank or over-long company or
    /// position, or a recruiter email that is not an address.
    pub fn validate(&self) -> Result<()> {
        validate_name("company", &self.company)?;
        validate_name("position", &self.position)?;
        if let Some(email) = non_blank(self.recruiter_email.as_deref()) {
            validate_email(email)?;
        }
        Ok(())
    }

    /// Resolves defaults and blank optional fields into stored fields.
    ///
    /// Blank optional strings become `None`; a missing submission date becomes
    /// `today`; a missing status becomes `applied`.
    pub fn normalize(self, today: NaiveDate) -> ApplicationFields {
        ApplicationFields {
            company: self.company.trim().to_string(),
            position: self.position.trim().to_string(),
            submission_date: self.submission_date.unwrap_or(today),
            source: self.source,
            status: self.status.unwrap_or_default(),
            recruiter_name: normalize_text(self.recruiter_name),
            recruiter_email: normalize_text(self.recruiter_email),
            recruiter_phone: normalize_text(self.recruiter_phone),
            notes: normalize_text(self.notes),
            last_contact_date: self.last_contact_date,
            next_follow_up: self.next_follow_up,
        }
    }
}

/// A partial update.
///
/// `None` leaves a field untouched. For optional fields `Some(None)` clears
/// the value. Ids, ownership and timestamps are not expressible here, so an
/// update can never change them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ApplicationSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recruiter_name: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recruiter_email: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recruiter_phone: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contact_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_follow_up: Option<Option<NaiveDate>>,
}

impl ApplicationPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: ApplicationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = Some(notes);
        self
    }

    pub fn recruiter_email(mut self, email: Option<String>) -> Self {
        self.recruiter_email = Some(email);
        self
    }

    pub fn last_contact_date(mut self, date: Option<NaiveDate>) -> Self {
        self.last_contact_date = Some(date);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Validates only the fields the patch touches.
    pub fn validate(&self) -> Result<()> {
        if let Some(company) = &self.company {
            validate_name("company", company)?;
        }
        if let Some(position) = &self.position {
            validate_name("position", position)?;
        }
        if let Some(Some(email)) = &self.recruiter_email
            && let Some(email) = non_blank(Some(email))
        {
            validate_email(email)?;
        }
        Ok(())
    }

    /// Shape sent to the remote store.
    ///
    /// Recruiter email, last contact date and notes that the patch leaves out
    /// are written as explicit nulls, so the remote document never keeps a
    /// stale value for them. Blank strings are normalized to null as well.
    pub fn into_remote(self) -> Self {
        Self {
            recruiter_name: self.recruiter_name.map(normalize_text),
            recruiter_phone: self.recruiter_phone.map(normalize_text),
            recruiter_email: Some(self.recruiter_email.and_then(normalize_text)),
            last_contact_date: Some(self.last_contact_date.flatten()),
            notes: Some(self.notes.and_then(normalize_text)),
            ..self
        }
    }

    /// Shallow merge: fields present in the patch replace the stored value,
    /// everything else is left unchanged.
    pub fn apply_to(&self, fields: &mut ApplicationFields) {
        if let Some(company) = &self.company {
            fields.company = company.trim().to_string();
        }
        if let Some(position) = &self.position {
            fields.position = position.trim().to_string();
        }
        if let Some(date) = self.submission_date {
            fields.submission_date = date;
        }
        if let Some(source) = self.source {
            fields.source = source;
        }
        if let Some(status) = self.status {
            fields.status = status;
        }
        if let Some(value) = &self.recruiter_name {
            fields.recruiter_name = normalize_text(value.clone());
        }
        if let Some(value) = &self.recruiter_email {
            fields.recruiter_email = normalize_text(value.clone());
        }
        if let Some(value) = &self.recruiter_phone {
            fields.recruiter_phone = normalize_text(value.clone());
        }
        if let Some(value) = &self.notes {
            fields.notes = normalize_text(value.clone());
        }
        if let Some(value) = self.last_contact_date {
            fields.last_contact_date = value;
        }
        if let Some(value) = self.next_follow_up {
            fields.next_follow_up = value;
        }
    }
}

fn normalize_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn validate_name(field: &str, value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::validation(format!("{} is required", field)));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(TrackerError::validation(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_LEN
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    let invalid = || TrackerError::validation(format!("invalid recruiter email '{}'", email));
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.split_once('.') {
        Some((host, _)) if !host.is_empty() && !domain.ends_with('.') => Ok(()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn stored() -> ApplicationFields {
        NewApplication {
            recruiter_email: Some("jane@acme.io".to_string()),
            notes: Some("call back".to_string()),
            last_contact_date: Some(date("2024-01-05")),
            ..NewApplication::new("Acme", "Intern")
        }
        .normalize(date("2024-01-01"))
    }

    #[test]
    fn test_normalize_applies_defaults() {
        let fields = NewApplication {
            notes: Some("   ".to_string()),
            recruiter_email: Some(String::new()),
            ..NewApplication::new(" Acme ", "Intern")
        }
        .normalize(date("2024-01-09"));

        assert_eq!(fields.company, "Acme");
        assert_eq!(fields.submission_date, date("2024-01-09"));
        assert_eq!(fields.status, ApplicationStatus::Applied);
        assert_eq!(fields.notes, None);
        assert_eq!(fields.recruiter_email, None);
        assert_eq!(fields.last_contact_date, None);
    }

    #[test]
    fn test_validate_rejects_blank_names() {
        assert!(NewApplication::new("", "Intern").validate().unwrap_err().is_validation());
        assert!(NewApplication::new("Acme", "  ").validate().is_err());
        assert!(NewApplication::new("a".repeat(101), "Intern").validate().is_err());
        assert!(NewApplication::new("Acme", "Intern").validate().is_ok());
    }

    #[test]
    fn test_validate_recruiter_email() {
        let mut input = NewApplication::new("Acme", "Intern");
        input.recruiter_email = Some("not-an-email".to_string());
        assert!(input.validate().is_err());
        input.recruiter_email = Some("jane@acme".to_string());
        assert!(input.validate().is_err());
        input.recruiter_email = Some("jane@acme.io".to_string());
        assert!(input.validate().is_ok());
        input.recruiter_email = Some(String::new());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_apply_is_shallow_merge() {
        let mut fields = stored();
        ApplicationPatch::new()
            .status(ApplicationStatus::HrCall)
            .apply_to(&mut fields);

        assert_eq!(fields.status, ApplicationStatus::HrCall);
        assert_eq!(fields.notes.as_deref(), Some("call back"));
        assert_eq!(fields.recruiter_email.as_deref(), Some("jane@acme.io"));
        assert_eq!(fields.last_contact_date, Some(date("2024-01-05")));
    }

    #[test]
    fn test_apply_clears_with_explicit_none() {
        let mut fields = stored();
        ApplicationPatch::new().notes(None).apply_to(&mut fields);
        assert_eq!(fields.notes, None);
        assert_eq!(fields.recruiter_email.as_deref(), Some("jane@acme.io"));
    }

    #[test]
    fn test_into_remote_nulls_omitted_optionals() {
        let patch = ApplicationPatch::new()
            .status(ApplicationStatus::Offer)
            .into_remote();

        assert_eq!(patch.status, Some(ApplicationStatus::Offer));
        assert_eq!(patch.recruiter_email, Some(None));
        assert_eq!(patch.last_contact_date, Some(None));
        assert_eq!(patch.notes, Some(None));
        assert_eq!(patch.recruiter_name, None);
        assert_eq!(patch.company, None);
    }

    #[test]
    fn test_into_remote_keeps_supplied_values() {
        let patch = ApplicationPatch::new()
            .notes(Some("follow up friday".to_string()))
            .last_contact_date(Some(date("2024-02-01")))
            .into_remote();
        assert_eq!(patch.notes, Some(Some("follow up friday".to_string())));
        assert_eq!(patch.last_contact_date, Some(Some(date("2024-02-01"))));
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ApplicationPatch::new().is_empty());
        assert!(!ApplicationPatch::new().status(ApplicationStatus::Offer).is_empty());
    }
}
