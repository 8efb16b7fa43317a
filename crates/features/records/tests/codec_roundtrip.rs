use proptest::prelude::*;
use scholar_domain::{AttendanceRecord, Course, Credential, Enrollment, Presence, Student, Teacher};
use scholar_records::{CodecRegistry, Decoded, Record};
use serde_json::Value;

fn grade() -> impl Strategy<Value = f64> {
    (0u32..=100).prop_map(|tenths| f64::from(tenths) / 10.0)
}

fn course_id() -> impl Strategy<Value = String> {
    "[A-Z]{3}[0-9]{3}"
}

fn personal_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        prop::collection::vec("[a-z]{0,6}", 0..3).prop_map(Value::from),
    ]
}

fn student() -> impl Strategy<Value = Student> {
    (
        "[a-z]{1,8}",
        "[A-Za-z ]{1,16}",
        "[0-9]{3,6}",
        prop::collection::btree_map(
            course_id(),
            (prop::collection::vec(grade(), 0..4), prop::collection::vec(any::<bool>(), 0..5)),
            0..3,
        ),
        prop::collection::btree_map("[a-z]{1,8}", personal_value(), 0..3),
    )
        .prop_map(|(login, name, ra, courses, personal_data)| {
            let mut student = Student::new(login, Credential::new("typed-at-registration"), name, ra);
            for (id, (grades, marks)) in courses {
                student.enrollments.insert(id.clone(), Enrollment::enrolled());
                student.grades.insert(id.clone(), grades);
                let records = marks
                    .into_iter()
                    .map(|present| AttendanceRecord {
                        timestamp: "2024-03-01 10:00:00".to_owned(),
                        presence: Presence::from_present(present),
                    })
                    .collect();
                student.attendance.insert(id, records);
            }
            student.personal_data = personal_data;
            student
        })
}

fn teacher() -> impl Strategy<Value = Teacher> {
    ("[a-z]{1,8}", "[A-Za-z ]{1,16}", prop::collection::vec(course_id(), 0..4)).prop_map(|(login, name, courses)| {
        let mut teacher = Teacher::new(login, Credential::new("typed-at-registration"), name);
        teacher.courses = courses;
        teacher
    })
}

fn course() -> impl Strategy<Value = Course> {
    (course_id(), "[A-Za-z ]{1,16}", prop::option::of("[a-z]{1,8}"), prop::collection::btree_set("[0-9]{3,6}", 0..5))
        .prop_map(|(id, name, teacher, roster)| {
            let mut course = Course::new(id, name, teacher);
            course.roster = roster.into_iter().collect();
            course
        })
}

fn round_trip(record: &Record) -> Record {
    let registry = CodecRegistry::standard();
    match registry.decode(registry.encode(record).expect("encodes")).expect("decodes") {
        Decoded::Record(record) => record,
        Decoded::Raw(raw) => panic!("decoded as raw value: {raw}"),
    }
}

proptest! {
    #[test]
    fn students_survive_round_trip_except_credentials(mut original in student()) {
        let decoded = round_trip(&Record::Student(original.clone()));
        original.identity.credential = Credential::placeholder();
        prop_assert_eq!(decoded, Record::Student(original));
    }

    #[test]
    fn teachers_survive_round_trip_except_credentials(mut original in teacher()) {
        let decoded = round_trip(&Record::Teacher(original.clone()));
        original.identity.credential = Credential::placeholder();
        prop_assert_eq!(decoded, Record::Teacher(original));
    }

    #[test]
    fn courses_survive_round_trip(original in course()) {
        let decoded = round_trip(&Record::Course(original.clone()));
        prop_assert_eq!(decoded, Record::Course(original));
    }
}
