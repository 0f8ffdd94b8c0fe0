//! Application record domain model.
//!
//! This module contains the `ApplicationRecord` entity and the value objects
//! it is built from. Serialized field names are camelCase and enum values are
//! kebab-case so stored documents stay readable by other clients.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Prefix carried by ids minted for guest records.
///
/// Routing never inspects it (see [`RecordOrigin`]); it only keeps local ids
/// visually distinct from ids assigned by the remote store.
pub const LOCAL_ID_PREFIX: &str = "guest_";

/// Opaque record identifier, unique within one identity's record set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mints a fresh id for a record held in the local guest store.
    pub fn new_local() -> Self {
        Self(format!("{}{}", LOCAL_ID_PREFIX, Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Which backend owns a record.
///
/// Set once when the record is created and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RecordOrigin {
    /// Held in the local guest store.
    ///
    /// Blobs written before the tag existed carry no origin; everything in the
    /// local store is local, so that is the default.
    #[default]
    Local,
    /// Held in the remote per-user document collection.
    Remote,
}

/// Progress of an application through the hiring pipeline.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    Default,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    HrCall,
    Technical,
    Offer,
    Rejected,
    NoResponse,
}

impl ApplicationStatus {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Applied => "Applied",
            Self::HrCall => "HR Call",
            Self::Technical => "Technical Interview",
            Self::Offer => "Offer",
            Self::Rejected => "Rejected",
            Self::NoResponse => "No Response",
        }
    }

    /// Terminal states never need a follow-up.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Offer | Self::Rejected)
    }

    /// Still moving through the pipeline.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Applied | Self::HrCall | Self::Technical)
    }
}

/// Where the candidate found the opening.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    Default,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ApplicationSource {
    Linkedin,
    CompanyWebsite,
    Referral,
    Indeed,
    #[default]
    Other,
}

impl ApplicationSource {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Linkedin => "LinkedIn",
            Self::CompanyWebsite => "Company Website",
            Self::Referral => "Referral",
            Self::Indeed => "Indeed",
            Self::Other => "Other",
        }
    }
}

/// The user-editable content of an application, without identity.
///
/// Optional fields use `None` as the explicit "empty" marker; normalization
/// turns blank strings into `None` before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationFields {
    pub company: String,
    pub position: String,
    #[serde(with = "calendar_date")]
    pub submission_date: NaiveDate,
    #[serde(default)]
    pub source: ApplicationSource,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recruiter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recruiter_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recruiter_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Defaults conceptually to `submission_date` when absent.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "calendar_date::option"
    )]
    pub last_contact_date: Option<NaiveDate>,
    /// Carried for other clients; no logic here reads it.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "calendar_date::option"
    )]
    pub next_follow_up: Option<NaiveDate>,
}

/// One tracked job application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: RecordId,
    #[serde(default)]
    pub origin: RecordOrigin,
    #[serde(flatten)]
    pub fields: ApplicationFields,
}

impl ApplicationRecord {
    pub fn new(id: RecordId, origin: RecordOrigin, fields: ApplicationFields) -> Self {
        Self { id, origin, fields }
    }

    pub fn is_local(&self) -> bool {
        self.origin == RecordOrigin::Local
    }

    /// The date staleness is measured from: last contact, else submission.
    pub fn reference_date(&self) -> NaiveDate {
        self.fields
            .last_contact_date
            .unwrap_or(self.fields.submission_date)
    }
}

/// Serde helpers for calendar dates.
///
/// Dates are written as `YYYY-MM-DD`. Reading also accepts full RFC 3339
/// timestamps, which older clients stored for defaulted submission dates.
pub mod calendar_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn parse(value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        NaiveDate::parse_from_str(value, FORMAT)
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(value)
                    .ok()
                    .map(|dt| dt.date_naive())
            })
    }

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw)))
    }

    pub mod option {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        /// `null` and the empty string both read as absent.
        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw))),
            }
        }
    }
}
