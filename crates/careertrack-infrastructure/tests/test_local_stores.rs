use careertrack_core::application::{
    ApplicationRecord, ApplicationSource, ApplicationStatus, LocalStore, NewApplication, RecordId,
    RecordOrigin,
};
use careertrack_infrastructure::{InMemoryLocalStore, JsonFileLocalStore};
use chrono::NaiveDate;
use tempfile::TempDir;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn sample_records() -> Vec<ApplicationRecord> {
    let full = NewApplication {
        recruiter_name: Some("Jane Doe".to_string()),
        recruiter_email: Some("jane@acme.io".to_string()),
        recruiter_phone: Some("+1 555 0100".to_string()),
        notes: Some("Second round on Friday".to_string()),
        last_contact_date: Some(date("2024-01-05")),
        next_follow_up: Some(date("2024-01-12")),
        ..NewApplication::new("Acme", "Intern")
            .with_source(ApplicationSource::Referral)
            .with_status(ApplicationStatus::Technical)
            .with_submission_date(date("2024-01-01"))
    };
    let minimal = NewApplication::new("Globex", "Engineer").with_source(ApplicationSource::Indeed);

    vec![
        ApplicationRecord::new(
            RecordId::new_local(),
            RecordOrigin::Local,
            full.normalize(date("2024-01-01")),
        ),
        ApplicationRecord::new(
            RecordId::new_local(),
            RecordOrigin::Local,
            minimal.normalize(date("2024-02-01")),
        ),
    ]
}

#[tokio::test]
async fn test_json_file_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonFileLocalStore::with_path(temp_dir.path().join("guest.json"));

    let records = sample_records();
    store.write_all(&records).await.expect("Should write records");

    // A fresh handle on the same file sees the same list
    let reopened = JsonFileLocalStore::with_path(temp_dir.path().join("guest.json"));
    let loaded = reopened.read_all().await.unwrap().expect("Should have a blob");
    assert_eq!(loaded, records);
}

#[tokio::test]
async fn test_json_file_empty_list_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonFileLocalStore::with_path(temp_dir.path().join("guest.json"));

    assert_eq!(store.read_all().await.unwrap(), None);
    store.write_all(&[]).await.unwrap();
    assert_eq!(store.read_all().await.unwrap(), Some(Vec::new()));
}

#[tokio::test]
async fn test_json_file_malformed_blob_is_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("guest.json");
    std::fs::write(&path, "{\"oops\": ").unwrap();

    let store = JsonFileLocalStore::with_path(path);
    let err = store.read_all().await.unwrap_err();
    assert!(err.is_parse(), "expected parse error, got {err:?}");
}

#[tokio::test]
async fn test_json_file_reads_blob_from_older_clients() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("guest.json");
    std::fs::write(
        &path,
        r#"[{
            "id": "guest_1704100000000_k3j4h5g6f",
            "company": "Acme",
            "position": "Intern",
            "submissionDate": "2024-01-01T09:30:00.000Z",
            "source": "linkedin",
            "status": "applied",
            "recruiterEmail": null,
            "lastContactDate": null,
            "notes": null
        }]"#,
    )
    .unwrap();

    let store = JsonFileLocalStore::with_path(path);
    let records = store.read_all().await.unwrap().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].origin, RecordOrigin::Local);
    assert_eq!(records[0].fields.submission_date, date("2024-01-01"));
}

#[tokio::test]
async fn test_json_file_clear() {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonFileLocalStore::with_path(temp_dir.path().join("guest.json"));
    store.write_all(&sample_records()).await.unwrap();
    store.clear().await.unwrap();
    assert_eq!(store.read_all().await.unwrap(), None);
}

#[tokio::test]
async fn test_in_memory_round_trip_and_faults() {
    let store = InMemoryLocalStore::new();
    let records = sample_records();
    store.write_all(&records).await.unwrap();
    assert_eq!(store.read_all().await.unwrap(), Some(records.clone()));

    store.set_fail_writes(true);
    assert!(store.write_all(&[]).await.unwrap_err().is_io());
    // The failed write did not replace the blob
    assert_eq!(store.read_all().await.unwrap(), Some(records));

    let corrupt = InMemoryLocalStore::with_raw("not json");
    assert!(corrupt.read_all().await.unwrap_err().is_parse());
}
