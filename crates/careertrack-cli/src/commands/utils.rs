use anyhow::{Context, Result};
use careertrack_application::{SyncManager, SyncOptions};
use careertrack_core::application::ApplicationRecord;
use careertrack_core::clock::SystemClock;
use careertrack_infrastructure::paths::CareerTrackPaths;
use careertrack_infrastructure::{
    ChannelSessionObserver, ConfigService, InMemoryRemoteStore, JsonFileLocalStore,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Builds a manager over the guest file and loads it.
///
/// The CLI has no sign-in, so the session starts and stays signed out and
/// every record lives in the local JSON file.
pub async fn open_manager(data_dir: Option<PathBuf>) -> Result<SyncManager> {
    let paths = CareerTrackPaths::new(data_dir);
    let config = ConfigService::new(&paths)?
        .get_config()
        .context("Failed to load configuration")?;

    let guest_file = match config.storage.guest_file.clone() {
        Some(path) => path,
        None => paths.guest_file()?,
    };
    tracing::debug!("[CLI] Using guest file {:?}", guest_file);

    let manager = SyncManager::new(
        Arc::new(InMemoryRemoteStore::new()),
        Arc::new(JsonFileLocalStore::with_path(guest_file)),
        Arc::new(SystemClock),
        SyncOptions::from(&config.sync),
    );
    manager.start(&ChannelSessionObserver::new()).await;
    Ok(manager)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One line per record: id, company, position, status, dates.
pub fn format_record(record: &ApplicationRecord) -> String {
    let fields = &record.fields;
    let mut line = format!(
        "{}  {} - {}  [{}]  submitted {}",
        record.id,
        fields.company,
        fields.position,
        fields.status.label(),
        fields.submission_date
    );
    if let Some(contact) = fields.last_contact_date {
        line.push_str(&format!("  last contact {}", contact));
    }
    line
}

pub fn print_records(records: &[ApplicationRecord], json: bool) -> Result<()> {
    if json {
        return print_json(records);
    }
    if records.is_empty() {
        println!("No applications.");
    }
    for record in records {
        println!("{}", format_record(record));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use careertrack_core::application::{NewApplication, RecordId, RecordOrigin};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_format_record() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut fields = NewApplication::new("Acme", "Engineer").normalize(date);
        fields.last_contact_date = NaiveDate::from_ymd_opt(2024, 1, 5);
        let record = ApplicationRecord::new(RecordId::from("guest_1"), RecordOrigin::Local, fields);

        let line = format_record(&record);
        assert!(line.starts_with("guest_1  Acme - Engineer"));
        assert!(line.contains("submitted 2024-01-01"));
        assert!(line.contains("last contact 2024-01-05"));
    }

    #[tokio::test]
    async fn test_open_manager_in_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let manager = open_manager(Some(temp_dir.path().to_path_buf()))
            .await
            .unwrap();
        manager
            .add(NewApplication::new("Acme", "Engineer"))
            .await
            .unwrap();
        manager.shutdown().await;

        let reopened = open_manager(Some(temp_dir.path().to_path_buf()))
            .await
            .unwrap();
        assert_eq!(reopened.records().len(), 1);
    }

    #[tokio::test]
    async fn test_open_manager_honors_guest_file_setting() {
        let temp_dir = TempDir::new().unwrap();
        let guest_file = temp_dir.path().join("elsewhere.json");
        std::fs::write(
            temp_dir.path().join("config.toml"),
            format!("[storage]\nguest_file = {:?}\n", guest_file),
        )
        .unwrap();

        let manager = open_manager(Some(temp_dir.path().to_path_buf()))
            .await
            .unwrap();
        manager
            .add(NewApplication::new("Acme", "Engineer"))
            .await
            .unwrap();

        assert!(guest_file.exists());
    }
}
