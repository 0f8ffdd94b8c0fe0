use anyhow::{Result, bail};
use careertrack_application::SyncManager;
use careertrack_core::application::{
    ApplicationPatch, ApplicationSource, ApplicationStatus, NewApplication, RecordId,
};
use chrono::NaiveDate;
use clap::Args;

use super::utils::{format_record, print_json, print_records};

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    pub company: String,
    pub position: String,
    /// Submission date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub status: Option<ApplicationStatus>,
    #[arg(long)]
    pub source: Option<ApplicationSource>,
    #[arg(long)]
    pub recruiter_name: Option<String>,
    #[arg(long)]
    pub recruiter_email: Option<String>,
    #[arg(long)]
    pub recruiter_phone: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Last contact with the company (YYYY-MM-DD)
    #[arg(long)]
    pub last_contact: Option<NaiveDate>,
    /// Planned follow-up date (YYYY-MM-DD)
    #[arg(long)]
    pub next_follow_up: Option<NaiveDate>,
}

impl From<AddArgs> for NewApplication {
    fn from(args: AddArgs) -> Self {
        Self {
            company: args.company,
            position: args.position,
            submission_date: args.date,
            source: args.source.unwrap_or_default(),
            status: args.status,
            recruiter_name: args.recruiter_name,
            recruiter_email: args.recruiter_email,
            recruiter_phone: args.recruiter_phone,
            notes: args.notes,
            last_contact_date: args.last_contact,
            next_follow_up: args.next_follow_up,
        }
    }
}

/// Fields left out are kept. An empty string clears an optional field.
#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Record id as shown by `list`
    pub id: String,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub position: Option<String>,
    #[arg(long)]
    pub status: Option<ApplicationStatus>,
    #[arg(long)]
    pub source: Option<ApplicationSource>,
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub recruiter_name: Option<String>,
    #[arg(long)]
    pub recruiter_email: Option<String>,
    #[arg(long)]
    pub recruiter_phone: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub last_contact: Option<NaiveDate>,
    #[arg(long)]
    pub next_follow_up: Option<NaiveDate>,
}

impl UpdateArgs {
    pub fn to_patch(&self) -> ApplicationPatch {
        ApplicationPatch {
            company: self.company.clone(),
            position: self.position.clone(),
            submission_date: self.date,
            source: self.source,
            status: self.status,
            recruiter_name: self.recruiter_name.clone().map(Some),
            recruiter_email: self.recruiter_email.clone().map(Some),
            recruiter_phone: self.recruiter_phone.clone().map(Some),
            notes: self.notes.clone().map(Some),
            last_contact_date: self.last_contact.map(Some),
            next_follow_up: self.next_follow_up.map(Some),
        }
    }
}

pub async fn add(manager: &SyncManager, args: AddArgs, json: bool) -> Result<()> {
    let record = manager.add(args.into()).await?;
    if json {
        print_json(&record)
    } else {
        println!("Added {}", format_record(&record));
        Ok(())
    }
}

pub fn list(manager: &SyncManager, status: Option<ApplicationStatus>, json: bool) -> Result<()> {
    print_records(&manager.filter_by_status(status), json)
}

pub async fn update(manager: &SyncManager, args: UpdateArgs) -> Result<()> {
    let patch = args.to_patch();
    if patch.is_empty() {
        bail!("Nothing to update; pass at least one field");
    }
    manager.update(&RecordId::from(args.id.as_str()), patch).await?;
    println!("Updated {}", args.id);
    Ok(())
}

pub async fn delete(manager: &SyncManager, id: &str) -> Result<()> {
    manager.delete(&RecordId::from(id)).await?;
    println!("Deleted {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_args(id: &str) -> UpdateArgs {
        UpdateArgs {
            id: id.to_string(),
            company: None,
            position: None,
            status: None,
            source: None,
            date: None,
            recruiter_name: None,
            recruiter_email: None,
            recruiter_phone: None,
            notes: None,
            last_contact: None,
            next_follow_up: None,
        }
    }

    #[test]
    fn test_update_args_only_touch_given_fields() {
        let args = UpdateArgs {
            status: Some(ApplicationStatus::Offer),
            notes: Some(String::new()),
            ..update_args("guest_1")
        };
        let patch = args.to_patch();
        assert_eq!(patch.status, Some(ApplicationStatus::Offer));
        assert_eq!(patch.notes, Some(Some(String::new())));
        assert_eq!(patch.company, None);
        assert_eq!(patch.recruiter_email, None);
    }

    #[test]
    fn test_empty_update_args_give_empty_patch() {
        assert!(update_args("guest_1").to_patch().is_empty());
    }
}
