use scholar_domain::{Credential, Enrollment};
use scholar_records::{NewAccount, Records, TeacherAssignment, Withdrawal};
use scholar_storage::Storage;
use tempfile::TempDir;

async fn fresh() -> (TempDir, Records) {
    let temp = TempDir::new().unwrap();
    let storage = Storage::builder().root(temp.path()).connect().await.unwrap();
    let (records, _) = Records::new(storage).open().await.unwrap();
    (temp, records)
}

async fn seed(records: &mut Records) {
    let assignment = records.create_course("MAT101", "Calculus I", None).await.unwrap();
    assert_eq!(assignment, TeacherAssignment::Unassigned);
    records
        .register(NewAccount::Student {
            login: "maria".into(),
            credential: Credential::new("pw"),
            name: "Maria Souza".into(),
            ra: "1001".into(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn enroll_then_withdraw_restores_unenrolled_state() {
    let (_temp, mut records) = fresh().await;
    seed(&mut records).await;

    assert!(records.enroll("1001", "MAT101").await.unwrap());
    assert_eq!(records.course("MAT101").unwrap().roster, ["1001"]);
    assert_eq!(records.student("1001").unwrap().enrollments.get("MAT101"), Some(&Enrollment::enrolled()));

    let outcome = records.withdraw("1001", "MAT101").await.unwrap();
    assert_eq!(outcome, Withdrawal::Withdrawn);
    assert!(records.course("MAT101").unwrap().roster.is_empty());
    assert!(records.student("1001").unwrap().enrollments.is_empty());
}

#[tokio::test]
async fn double_enroll_keeps_a_single_roster_entry() {
    let (_temp, mut records) = fresh().await;
    seed(&mut records).await;

    assert!(records.enroll("1001", "MAT101").await.unwrap());
    assert!(!records.enroll("1001", "MAT101").await.unwrap());
    assert_eq!(records.course("MAT101").unwrap().roster, ["1001"]);
}

#[tokio::test]
async fn enroll_unknown_student_or_course_changes_nothing() {
    let (_temp, mut records) = fresh().await;
    seed(&mut records).await;

    assert!(!records.enroll("9999", "MAT101").await.unwrap());
    assert!(!records.enroll("1001", "FIS201").await.unwrap());
    assert!(records.course("MAT101").unwrap().roster.is_empty());
    assert!(records.student("1001").unwrap().enrollments.is_empty());
}

#[tokio::test]
async fn withdraw_reports_each_failure_in_order() {
    let (_temp, mut records) = fresh().await;
    seed(&mut records).await;

    let missing_both = records.withdraw("9999", "FIS201").await.unwrap();
    assert_eq!(missing_both.into_parts(), (false, "Student not found."));

    let missing_course = records.withdraw("1001", "FIS201").await.unwrap();
    assert_eq!(missing_course.into_parts(), (false, "Course not found."));

    let not_enrolled = records.withdraw("1001", "MAT101").await.unwrap();
    assert_eq!(not_enrolled.into_parts(), (false, "Student is not enrolled in this course."));
}

#[tokio::test]
async fn withdraw_drops_grades_and_attendance() {
    let (_temp, mut records) = fresh().await;
    records
        .register(NewAccount::Teacher { login: "prof1".into(), credential: Credential::new("pw"), name: "Carlos".into() })
        .await
        .unwrap();
    records.create_course("MAT101", "Calculus I", Some("prof1")).await.unwrap();
    records
        .register(NewAccount::Student {
            login: "maria".into(),
            credential: Credential::new("pw"),
            name: "Maria Souza".into(),
            ra: "1001".into(),
        })
        .await
        .unwrap();
    records.enroll("1001", "MAT101").await.unwrap();
    records.post_grade("prof1", "MAT101", "1001", 8.5).await.unwrap();
    let marks = [("1001".to_owned(), scholar_domain::Presence::Present)].into_iter().collect();
    assert_eq!(records.record_attendance("prof1", "MAT101", &marks).await.unwrap(), 1);

    assert!(records.withdraw("1001", "MAT101").await.unwrap().is_withdrawn());

    let student = records.student("1001").unwrap();
    assert!(student.grades.is_empty());
    assert!(student.attendance.is_empty());
    assert!(!records.course("MAT101").unwrap().has_student("1001"));
}

#[tokio::test]
async fn enrollment_survives_reload() {
    let (temp, mut records) = fresh().await;
    seed(&mut records).await;
    records.enroll("1001", "MAT101").await.unwrap();

    let storage = Storage::builder().root(temp.path()).connect().await.unwrap();
    let mut reloaded = Records::new(storage);
    let report = reloaded.load().await;

    assert!(report.is_clean(), "unexpected warnings: {:?}", report.warnings);
    assert_eq!(reloaded.course("MAT101").unwrap().roster, ["1001"]);
    assert!(reloaded.student("1001").unwrap().is_enrolled("MAT101"));
}
