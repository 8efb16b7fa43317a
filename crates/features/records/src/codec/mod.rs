//! # Tagged codec
//!
//! Entities are stored as JSON objects whose `__class__` field names their kind. The
//! [`CodecRegistry`] maps each [`Tag`] to an explicit encode/decode [`Rule`]; nothing is looked
//! up by reflection.
//!
//! Credentials are never written. Decoding assigns the fixed placeholder credential to every
//! account, so a saved store does not remember passwords across restarts.

mod registry;
mod wire;

pub use registry::{CodecRegistry, DecodeFn, EncodeFn, Rule};

use scholar_domain::{Course, Identity, Student, Teacher};
use serde_json::Value;
use std::fmt;

/// Name of the discriminator field.
pub const CLASS_KEY: &str = "__class__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// A base identity (administrator or registrar).
    User,
    Teacher,
    Student,
    Course,
}

impl Tag {
    pub const ALL: [Self; 4] = [Self::User, Self::Teacher, Self::Student, Self::Course];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "Usuario",
            Self::Teacher => "Professor",
            Self::Student => "Aluno",
            Self::Course => "Disciplina",
        }
    }

    #[must_use]
    pub fn from_wire(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An owned entity of any stored kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Identity(Identity),
    Teacher(Teacher),
    Student(Student),
    Course(Course),
}

impl Record {
    #[must_use]
    pub const fn tag(&self) -> Tag {
        match self {
            Self::Identity(_) => Tag::User,
            Self::Teacher(_) => Tag::Teacher,
            Self::Student(_) => Tag::Student,
            Self::Course(_) => Tag::Course,
        }
    }

    #[must_use]
    pub const fn view(&self) -> RecordRef<'_> {
        match self {
            Self::Identity(identity) => RecordRef::Identity(identity),
            Self::Teacher(teacher) => RecordRef::Teacher(teacher),
            Self::Student(student) => RecordRef::Student(student),
            Self::Course(course) => RecordRef::Course(course),
        }
    }
}

/// A borrowed entity, used for encoding without cloning the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordRef<'a> {
    Identity(&'a Identity),
    Teacher(&'a Teacher),
    Student(&'a Student),
    Course(&'a Course),
}

impl RecordRef<'_> {
    #[must_use]
    pub const fn tag(self) -> Tag {
        match self {
            Self::Identity(_) => Tag::User,
            Self::Teacher(_) => Tag::Teacher,
            Self::Student(_) => Tag::Student,
            Self::Course(_) => Tag::Course,
        }
    }
}

impl<'a> From<&'a Record> for RecordRef<'a> {
    fn from(record: &'a Record) -> Self {
        record.view()
    }
}

impl<'a> From<&'a Identity> for RecordRef<'a> {
    fn from(identity: &'a Identity) -> Self {
        Self::Identity(identity)
    }
}

impl<'a> From<&'a Teacher> for RecordRef<'a> {
    fn from(teacher: &'a Teacher) -> Self {
        Self::Teacher(teacher)
    }
}

impl<'a> From<&'a Student> for RecordRef<'a> {
    fn from(student: &'a Student) -> Self {
        Self::Student(student)
    }
}

impl<'a> From<&'a Course> for RecordRef<'a> {
    fn from(course: &'a Course) -> Self {
        Self::Course(course)
    }
}

/// Result of decoding one value.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Record(Record),
    /// Not a recognised entity; returned exactly as given.
    Raw(Value),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecordsError;
    use scholar_domain::{AttendanceRecord, Credential, Enrollment, Presence, Role};
    use serde_json::json;

    #[test]
    fn student_encodes_with_stored_field_names_and_no_credential() {
        let mut student = Student::new("maria", Credential::new("s3cret"), "Maria Souza", "1001");
        student.enrollments.insert("MAT101".into(), Enrollment::enrolled());
        student.grades.insert("MAT101".into(), vec![6.0, 8.0]);
        student.attendance.insert(
            "MAT101".into(),
            vec![AttendanceRecord { timestamp: "2024-03-01 10:00:00".into(), presence: Presence::Absent }],
        );

        let value = CodecRegistry::standard().encode(&student).expect("encodes");
        assert_eq!(
            value,
            json!({
                "__class__": "Aluno",
                "login": "maria",
                "nome": "Maria Souza",
                "perfil": "aluno",
                "ra": "1001",
                "cursos": { "MAT101": { "status": "Matriculado" } },
                "frequencias": { "MAT101": [ { "data": "2024-03-01 10:00:00", "tipo": "F" } ] },
                "notas": { "MAT101": [6.0, 8.0] },
                "dados_pessoais": {}
            })
        );
        assert!(!value.to_string().contains("s3cret"));
    }

    #[test]
    fn decode_assigns_placeholder_credential_and_defaults() {
        let decoded = CodecRegistry::standard()
            .decode(json!({ "__class__": "Professor", "login": "prof1", "nome": "Carlos", "perfil": "professor" }))
            .expect("decodes");

        let teacher = match decoded {
            Decoded::Record(Record::Teacher(teacher)) => teacher,
            other => panic!("expected a teacher, got {other:?}"),
        };
        assert!(teacher.identity.credential.matches("123"));
        assert_eq!(teacher.identity.role, Role::Teacher);
        assert!(teacher.courses.is_empty());
    }

    #[test]
    fn course_without_teacher_round_trips_null() {
        let registry = CodecRegistry::standard();
        let course = Course::new("HIS100", "History", None);

        let value = registry.encode(&course).expect("encodes");
        assert_eq!(value["professor_login"], Value::Null);
        assert_eq!(registry.decode(value).expect("decodes"), Decoded::Record(Record::Course(course)));
    }

    #[test]
    fn unknown_or_missing_tags_pass_through() {
        let registry = CodecRegistry::standard();
        for raw in [json!({ "__class__": "Boletim", "x": 1 }), json!({ "login": "ghost" }), json!([1, 2]), json!("text")] {
            assert_eq!(registry.decode(raw.clone()).expect("passes through"), Decoded::Raw(raw));
        }
    }

    #[test]
    fn known_tag_with_missing_fields_is_a_decode_error() {
        let err = CodecRegistry::standard()
            .decode(json!({ "__class__": "Aluno", "login": "maria", "nome": "Maria" }))
            .expect_err("ra is required");
        assert!(matches!(err, RecordsError::Decode { .. }), "unexpected error: {err:?}");
    }

    #[test]
    fn missing_rule_fails_encoding_and_skips_decoding() {
        let registry = CodecRegistry::empty().with(Tag::User, Rule::standard(Tag::User));
        assert!(registry.contains(Tag::User));
        assert!(!registry.contains(Tag::Course));

        let err = registry.encode(&Course::new("MAT101", "Calculus I", None)).expect_err("no course rule");
        assert!(matches!(err, RecordsError::Serialization { .. }));

        let raw = json!({ "__class__": "Disciplina", "id": "MAT101", "nome": "Calculus I" });
        assert_eq!(registry.decode(raw.clone()).expect("passes through"), Decoded::Raw(raw));
    }

    #[test]
    fn tags_parse_from_their_stored_names() {
        for tag in Tag::ALL {
            assert_eq!(Tag::from_wire(tag.as_str()), Some(tag));
        }
        assert_eq!(Tag::from_wire("usuario"), None);
    }
}
