//! On-disk shapes of the four entity kinds. Field names are the stored ones; the credential
//! has no field at all.

use crate::codec::{Record, RecordRef, Tag};
use crate::error::{RecordsError, RecordsErrorExt};
use scholar_domain::{AttendanceRecord, Course, Credential, Enrollment, Identity, Role, Student, Teacher};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use fxhash::FxHashSet;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Serialize)]
struct UserOut<'a> {
    login: &'a str,
    #[serde(rename = "nome")]
    name: &'a str,
    #[serde(rename = "perfil")]
    role: Role,
}

#[derive(Deserialize)]
struct UserIn {
    login: String,
    #[serde(rename = "nome")]
    name: String,
    #[serde(rename = "perfil")]
    role: Role,
}

#[derive(Serialize)]
struct TeacherOut<'a> {
    login: &'a str,
    #[serde(rename = "nome")]
    name: &'a str,
    #[serde(rename = "perfil")]
    role: Role,
    #[serde(rename = "disciplinas_ministradas")]
    courses: &'a [String],
}

#[derive(Deserialize)]
struct TeacherIn {
    login: String,
    #[serde(rename = "nome")]
    name: String,
    #[serde(rename = "disciplinas_ministradas", default)]
    courses: Vec<String>,
}

#[derive(Serialize)]
struct StudentOut<'a> {
    login: &'a str,
    #[serde(rename = "nome")]
    name: &'a str,
    #[serde(rename = "perfil")]
    role: Role,
    ra: &'a str,
    #[serde(rename = "cursos")]
    enrollments: &'a BTreeMap<String, Enrollment>,
    #[serde(rename = "frequencias")]
    attendance: &'a BTreeMap<String, Vec<AttendanceRecord>>,
    #[serde(rename = "notas")]
    grades: &'a BTreeMap<String, Vec<f64>>,
    #[serde(rename = "dados_pessoais")]
    personal_data: &'a BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct StudentIn {
    login: String,
    #[serde(rename = "nome")]
    name: String,
    ra: String,
    #[serde(rename = "cursos", default)]
    enrollments: BTreeMap<String, Enrollment>,
    #[serde(rename = "frequencias", default)]
    attendance: BTreeMap<String, Vec<AttendanceRecord>>,
    #[serde(rename = "notas", default)]
    grades: BTreeMap<String, Vec<f64>>,
    #[serde(rename = "dados_pessoais", default)]
    personal_data: BTreeMap<String, Value>,
}

#[derive(Serialize)]
struct CourseOut<'a> {
    id: &'a str,
    #[serde(rename = "nome")]
    name: &'a str,
    #[serde(rename = "professor_login")]
    teacher: Option<&'a str>,
    #[serde(rename = "alunos_ra")]
    roster: &'a [String],
}

#[derive(Deserialize)]
struct CourseIn {
    id: String,
    #[serde(rename = "nome")]
    name: String,
    #[serde(rename = "professor_login", default)]
    teacher: Option<String>,
    #[serde(rename = "alunos_ra", default)]
    roster: Vec<String>,
}

pub(crate) fn encode_identity(record: RecordRef<'_>) -> Result<Map<String, Value>, RecordsError> {
    let RecordRef::Identity(identity) = record else { return Err(mismatch(Tag::User, record.tag())) };
    to_fields(&UserOut { login: &identity.login, name: &identity.name, role: identity.role })
}

pub(crate) fn encode_teacher(record: RecordRef<'_>) -> Result<Map<String, Value>, RecordsError> {
    let RecordRef::Teacher(teacher) = record else { return Err(mismatch(Tag::Teacher, record.tag())) };
    to_fields(&TeacherOut {
        login: &teacher.identity.login,
        name: &teacher.identity.name,
        role: teacher.identity.role,
        courses: &teacher.courses,
    })
}

pub(crate) fn encode_student(record: RecordRef<'_>) -> Result<Map<String, Value>, RecordsError> {
    let RecordRef::Student(student) = record else { return Err(mismatch(Tag::Student, record.tag())) };
    to_fields(&StudentOut {
        login: &student.identity.login,
        name: &student.identity.name,
        role: student.identity.role,
        ra: &student.ra,
        enrollments: &student.enrollments,
        attendance: &student.attendance,
        grades: &student.grades,
        personal_data: &student.personal_data,
    })
}

pub(crate) fn encode_course(record: RecordRef<'_>) -> Result<Map<String, Value>, RecordsError> {
    let RecordRef::Course(course) = record else { return Err(mismatch(Tag::Course, record.tag())) };
    to_fields(&CourseOut {
        id: &course.id,
        name: &course.name,
        teacher: course.teacher.as_deref(),
        roster: &course.roster,
    })
}

pub(crate) fn decode_identity(fields: Map<String, Value>) -> Result<Record, RecordsError> {
    let wire: UserIn = from_fields(fields, Tag::User)?;
    Ok(Record::Identity(Identity::new(wire.login, Credential::placeholder(), wire.name, wire.role)))
}

pub(crate) fn decode_teacher(fields: Map<String, Value>) -> Result<Record, RecordsError> {
    let wire: TeacherIn = from_fields(fields, Tag::Teacher)?;
    let mut teacher = Teacher::new(wire.login, Credential::placeholder(), wire.name);
    teacher.courses = wire.courses;
    Ok(Record::Teacher(teacher))
}

pub(crate) fn decode_student(fields: Map<String, Value>) -> Result<Record, RecordsError> {
    let wire: StudentIn = from_fields(fields, Tag::Student)?;
    let mut student = Student::new(wire.login, Credential::placeholder(), wire.name, wire.ra);
    student.enrollments = wire.enrollments;
    student.attendance = wire.attendance;
    student.grades = wire.grades;
    student.personal_data = wire.personal_data;
    Ok(Record::Student(student))
}

pub(crate) fn decode_course(fields: Map<String, Value>) -> Result<Record, RecordsError> {
    let wire: CourseIn = from_fields(fields, Tag::Course)?;
    let mut course = Course::new(wire.id, wire.name, wire.teacher);
    course.roster = dedup_roster(&course.id, wire.roster);
    Ok(Record::Course(course))
}

/// Drops repeated RAs, keeping the first occurrence of each.
fn dedup_roster(course_id: &str, roster: Vec<String>) -> Vec<String> {
    let mut seen = FxHashSet::default();
    let total = roster.len();
    let unique: Vec<String> = roster.into_iter().filter(|ra| seen.insert(ra.clone())).collect();
    if unique.len() < total {
        warn!(course_id, dropped = total - unique.len(), "Duplicate RAs removed from stored roster");
    }
    unique
}

fn to_fields<T: Serialize>(wire: &T) -> Result<Map<String, Value>, RecordsError> {
    match serde_json::to_value(wire) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(RecordsError::Serialization {
            message: format!("Entity encoded to a non-object value: {other}").into(),
            context: None,
        }),
        Err(e) => Err(RecordsError::Serialization { message: e.to_string().into(), context: None }),
    }
}

fn from_fields<T: DeserializeOwned>(fields: Map<String, Value>, tag: Tag) -> Result<T, RecordsError> {
    serde_json::from_value(Value::Object(fields)).context(format!("Decoding {tag}"))
}

fn mismatch(expected: Tag, found: Tag) -> RecordsError {
    RecordsError::Internal {
        message: format!("Rule for '{expected}' cannot encode a '{found}' record").into(),
        context: None,
    }
}
