use chrono::NaiveDate;
use scholar_domain::{AccountRef, Credential, Outcome, Presence, Role};
use scholar_records::{
    ClassMember, NewAccount, ProfileUpdate, REMOVED_COURSE_NAME, Records, RecordsError, Standing, TeacherAssignment,
};
use scholar_storage::Storage;
use std::collections::BTreeMap;
use tempfile::TempDir;

async fn fresh() -> (TempDir, Records) {
    let temp = TempDir::new().unwrap();
    let storage = Storage::builder().root(temp.path()).connect().await.unwrap();
    let (records, _) = Records::new(storage).open().await.unwrap();
    (temp, records)
}

fn student(login: &str, ra: &str) -> NewAccount {
    NewAccount::Student {
        login: login.into(),
        credential: Credential::new("pw"),
        name: format!("Student {ra}"),
        ra: ra.into(),
    }
}

fn teacher(login: &str) -> NewAccount {
    NewAccount::Teacher { login: login.into(), credential: Credential::new("pw"), name: "Carlos Lima".into() }
}

/// prof1 teaches MAT101 with students 1001 and 1002 enrolled.
async fn classroom() -> (TempDir, Records) {
    let (temp, mut records) = fresh().await;
    records.register(teacher("prof1")).await.unwrap();
    records.register(student("maria", "1001")).await.unwrap();
    records.register(student("joao", "1002")).await.unwrap();
    assert_eq!(records.create_course("MAT101", "Calculus I", Some("prof1")).await.unwrap(), TeacherAssignment::Assigned);
    assert!(records.enroll("1001", "MAT101").await.unwrap());
    assert!(records.enroll("1002", "MAT101").await.unwrap());
    (temp, records)
}

fn is_validation(result: Result<impl std::fmt::Debug, RecordsError>) -> bool {
    matches!(result, Err(RecordsError::Validation { .. }))
}

#[tokio::test]
async fn logins_are_unique_across_every_role() {
    let (_temp, mut records) = fresh().await;
    records.register(teacher("prof1")).await.unwrap();

    assert!(is_validation(records.register(student("prof1", "1001")).await));
    assert!(is_validation(records.register(student("admin", "1001")).await));
    assert!(is_validation(records.register(teacher("secretaria1")).await));
}

#[tokio::test]
async fn ra_is_unique_among_students() {
    let (_temp, mut records) = fresh().await;
    records.register(student("maria", "1001")).await.unwrap();

    assert!(is_validation(records.register(student("ana", "1001")).await));
    assert!(records.account("ana").is_none());
}

#[tokio::test]
async fn staff_accounts_only_take_base_roles() {
    let (_temp, mut records) = fresh().await;
    let staff = |role| NewAccount::Staff {
        login: "clerk".into(),
        credential: Credential::new("pw"),
        name: "Clerk".into(),
        role,
    };

    assert!(is_validation(records.register(staff(Role::Teacher)).await));
    records.register(staff(Role::Registrar)).await.unwrap();
    assert_eq!(records.account("clerk").unwrap().role(), Role::Registrar);
}

#[tokio::test]
async fn authenticate_checks_plaintext_credentials() {
    let (_temp, mut records) = fresh().await;
    records.register(student("maria", "1001")).await.unwrap();

    assert!(matches!(records.authenticate("maria", "pw"), Some(AccountRef::Student(s)) if s.ra == "1001"));
    assert!(records.authenticate("maria", "wrong").is_none());
    assert!(records.authenticate("nobody", "pw").is_none());
    assert_eq!(records.authenticate("admin", "123").map(AccountRef::role), Some(Role::Administrator));
}

#[tokio::test]
async fn create_course_reports_teacher_assignment() {
    let (_temp, mut records) = fresh().await;
    records.register(teacher("prof1")).await.unwrap();

    let assigned = records.create_course("MAT101", "Calculus I", Some("prof1")).await.unwrap();
    let missing = records.create_course("FIS201", "Physics", Some("ghost")).await.unwrap();
    let none = records.create_course("HIS100", "History", Some("  ")).await.unwrap();

    assert_eq!(assigned, TeacherAssignment::Assigned);
    assert_eq!(missing, TeacherAssignment::TeacherNotFound { login: "ghost".into() });
    assert_eq!(none, TeacherAssignment::Unassigned);
    assert_eq!(records.teacher("prof1").unwrap().courses, ["MAT101"]);
    assert_eq!(records.course("FIS201").unwrap().teacher, None);
    assert!(is_validation(records.create_course("MAT101", "Again", None).await));
}

#[tokio::test]
async fn post_grade_returns_running_average() {
    let (_temp, mut records) = classroom().await;

    assert!((records.post_grade("prof1", "MAT101", "1001", 6.0).await.unwrap() - 6.0).abs() < f64::EPSILON);
    assert!((records.post_grade("prof1", "MAT101", "1001", 8.0).await.unwrap() - 7.0).abs() < f64::EPSILON);
    assert_eq!(records.student("1001").unwrap().grades["MAT101"], [6.0, 8.0]);
}

#[tokio::test]
async fn post_grade_rejects_invalid_requests() {
    let (_temp, mut records) = classroom().await;
    records.register(teacher("prof2")).await.unwrap();
    records.register(student("ana", "1003")).await.unwrap();

    assert!(is_validation(records.post_grade("prof1", "MAT101", "1001", 10.5).await));
    assert!(is_validation(records.post_grade("prof1", "MAT101", "1001", -1.0).await));
    assert!(is_validation(records.post_grade("prof2", "MAT101", "1001", 7.0).await));
    assert!(is_validation(records.post_grade("prof1", "MAT101", "1003", 7.0).await));
    assert!(records.student("1001").unwrap().grades.is_empty());
}

#[tokio::test]
async fn attendance_marks_one_session_for_marked_students() {
    let (_temp, mut records) = classroom().await;
    let held = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(10, 30, 0).unwrap();

    let marks: BTreeMap<String, Presence> = [("1001".to_owned(), Presence::Absent)].into_iter().collect();
    assert_eq!(records.record_attendance_at("prof1", "MAT101", &marks, held).await.unwrap(), 1);

    let maria = records.student("1001").unwrap();
    assert_eq!(maria.attendance["MAT101"].len(), 1);
    assert_eq!(maria.attendance["MAT101"][0].timestamp, "2024-03-01 10:30:00");
    assert_eq!(maria.attendance["MAT101"][0].presence, Presence::Absent);
    assert!(records.student("1002").unwrap().attendance.is_empty());

    let stray: BTreeMap<String, Presence> = [("9999".to_owned(), Presence::Present)].into_iter().collect();
    assert!(is_validation(records.record_attendance_at("prof1", "MAT101", &stray, held).await));
    assert_eq!(records.record_attendance("prof1", "MAT101", &BTreeMap::new()).await.unwrap(), 0);
}

#[tokio::test]
async fn update_profile_keeps_blank_fields() {
    let (_temp, mut records) = classroom().await;

    let update = ProfileUpdate {
        name: Some(String::new()),
        credential: Some(Credential::new("new-pw")),
        address: Some("Rua A, 10".into()),
    };
    records.update_profile("1001", update).await.unwrap();

    let maria = records.student("1001").unwrap();
    assert_eq!(maria.identity.name, "Student 1001");
    assert_eq!(maria.address(), Some("Rua A, 10"));
    assert!(records.authenticate("maria", "new-pw").is_some());
    assert!(is_validation(records.update_profile("9999", ProfileUpdate::default()).await));
}

#[tokio::test]
async fn transcript_reports_outcomes_and_standing() {
    let (_temp, mut records) = classroom().await;
    records.create_course("HIS100", "History", None).await.unwrap();
    records.enroll("1001", "HIS100").await.unwrap();
    records.post_grade("prof1", "MAT101", "1001", 9.0).await.unwrap();

    let transcript = records.transcript("1001").unwrap();
    assert_eq!(transcript.lines.len(), 2);

    let history = transcript.lines.iter().find(|l| l.course_id == "HIS100").unwrap();
    assert_eq!(history.outcome, Outcome::FailedGrade);
    let calculus = transcript.lines.iter().find(|l| l.course_id == "MAT101").unwrap();
    assert_eq!(calculus.outcome, Outcome::Passed);
    assert!((calculus.attendance_percent - 100.0).abs() < f64::EPSILON);
    assert_eq!(transcript.standing, Standing::Pending { failures: 1 });

    records.post_grade("prof1", "MAT101", "1002", 7.0).await.unwrap();
    assert_eq!(records.transcript("1002").unwrap().standing, Standing::Regular);
    assert!(is_validation(records.transcript("9999")));
}

#[tokio::test]
async fn transcript_names_removed_courses() {
    let temp = TempDir::new().unwrap();
    let document = serde_json::json!({
        "usuarios": { "admin": { "__class__": "Usuario", "login": "admin", "nome": "Admin Master", "perfil": "administrador" } },
        "alunos": {
            "1001": {
                "__class__": "Aluno", "login": "maria", "nome": "Maria", "perfil": "aluno", "ra": "1001",
                "cursos": { "QUI300": { "status": "Matriculado" } }
            }
        }
    });
    std::fs::write(temp.path().join("sistema_academico_dados.json"), document.to_string()).unwrap();
    let storage = Storage::builder().root(temp.path()).connect().await.unwrap();
    let (records, report) = Records::new(storage).open().await.unwrap();
    assert!(report.is_clean());

    let transcript = records.transcript("1001").unwrap();
    assert_eq!(transcript.lines[0].course_name, REMOVED_COURSE_NAME);
}

#[tokio::test]
async fn class_lists_name_enrolled_students() {
    let (_temp, records) = classroom().await;

    let lists = records.class_lists("prof1").unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].course_name, "Calculus I");
    assert_eq!(
        lists[0].members,
        [
            ClassMember { ra: "1001".into(), name: Some("Student 1001".into()) },
            ClassMember { ra: "1002".into(), name: Some("Student 1002".into()) },
        ]
    );
    assert!(is_validation(records.class_lists("maria")));
}
