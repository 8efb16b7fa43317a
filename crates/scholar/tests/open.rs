use scholar::domain::config::AppConfig;
use scholar::domain::{GradingPolicy, Outcome};
use scholar::records::{LoadWarning, NewAccount};
use scholar::domain::Credential;

#[tokio::test]
async fn open_creates_data_dir_and_applies_policy() {
    let temp = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.storage.data_dir = temp.path().join("nested").join("data");
    config.storage.file_name = "records.json".to_owned();
    config.grading = GradingPolicy { passing_average: 5.0, minimum_attendance: 75.0 };

    let (mut records, report) = scholar::open(&config).await.unwrap();
    assert_eq!(report.warnings, [LoadWarning::MissingFile]);
    assert!(config.storage.data_dir.join("records.json").is_file());

    records
        .register(NewAccount::Teacher { login: "prof1".into(), credential: Credential::new("pw"), name: "Carlos".into() })
        .await
        .unwrap();
    records
        .register(NewAccount::Student {
            login: "maria".into(),
            credential: Credential::new("pw"),
            name: "Maria".into(),
            ra: "1001".into(),
        })
        .await
        .unwrap();
    records.create_course("MAT101", "Calculus I", Some("prof1")).await.unwrap();
    records.enroll("1001", "MAT101").await.unwrap();
    records.post_grade("prof1", "MAT101", "1001", 5.5).await.unwrap();

    assert_eq!(records.transcript("1001").unwrap().lines[0].outcome, Outcome::Passed);

    let (reopened, report) = scholar::open(&config).await.unwrap();
    assert!(report.is_clean());
    assert!(reopened.student("1001").unwrap().is_enrolled("MAT101"));
}
