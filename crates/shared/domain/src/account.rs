//! Accounts: the base identity shared by every user and its two role extensions.

use crate::constants::{ADDRESS_KEY, PLACEHOLDER_CREDENTIAL};
use crate::grading::{AttendanceSummary, Evaluation, GradingPolicy, calculate_average, evaluate_outcome};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Access profile of an account. The serialized names are the ones stored in the records file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "administrador")]
    Administrator,
    #[serde(rename = "secretaria")]
    Registrar,
    #[serde(rename = "professor")]
    Teacher,
    #[serde(rename = "aluno")]
    Student,
}

impl Role {
    pub const ALL: [Self; 4] = [Self::Administrator, Self::Registrar, Self::Teacher, Self::Student];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Administrator => "administrador",
            Self::Registrar => "secretaria",
            Self::Teacher => "professor",
            Self::Student => "aluno",
        }
    }

    /// Administrator and registrar accounts carry no role extension.
    #[must_use]
    pub const fn is_base(self) -> bool {
        matches!(self, Self::Administrator | Self::Registrar)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError(String);

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    /// Accepts the stored names and their English equivalents, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "administrador" | "administrator" | "admin" => Ok(Self::Administrator),
            "secretaria" | "registrar" => Ok(Self::Registrar),
            "professor" | "teacher" => Ok(Self::Teacher),
            "aluno" | "student" => Ok(Self::Student),
            _ => Err(ParseRoleError(s.to_owned())),
        }
    }
}

/// A plaintext secret. Never serialized and redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The fixed credential given to accounts rebuilt from the records file.
    #[must_use]
    pub fn placeholder() -> Self {
        Self(PLACEHOLDER_CREDENTIAL.to_owned())
    }

    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub login: String,
    pub credential: Credential,
    pub name: String,
    pub role: Role,
}

impl Identity {
    pub fn new(login: impl Into<String>, credential: Credential, name: impl Into<String>, role: Role) -> Self {
        Self { login: login.into(), credential, name: name.into(), role }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Teacher {
    pub identity: Identity,
    /// Ids of taught courses, in assignment order.
    pub courses: Vec<String>,
}

impl Teacher {
    pub fn new(login: impl Into<String>, credential: Credential, name: impl Into<String>) -> Self {
        Self { identity: Identity::new(login, credential, name, Role::Teacher), courses: Vec::new() }
    }

    #[must_use]
    pub fn login(&self) -> &str {
        &self.identity.login
    }

    #[must_use]
    pub fn teaches(&self, course_id: &str) -> bool {
        self.courses.iter().any(|c| c == course_id)
    }
}

/// The only enrollment state. Unenrolled pairs have no entry at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrollmentStatus {
    #[serde(rename = "Matriculado")]
    Enrolled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub status: EnrollmentStatus,
}

impl Enrollment {
    #[must_use]
    pub const fn enrolled() -> Self {
        Self { status: EnrollmentStatus::Enrolled }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Presence {
    #[serde(rename = "P")]
    Present,
    #[serde(rename = "F")]
    Absent,
}

impl Presence {
    #[must_use]
    pub const fn from_present(present: bool) -> Self {
        if present { Self::Present } else { Self::Absent }
    }
}

/// One attended (or missed) session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(rename = "data")]
    pub timestamp: String,
    #[serde(rename = "tipo")]
    pub presence: Presence,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub identity: Identity,
    /// Registration number, unique among students.
    pub ra: String,
    pub enrollments: BTreeMap<String, Enrollment>,
    pub grades: BTreeMap<String, Vec<f64>>,
    pub attendance: BTreeMap<String, Vec<AttendanceRecord>>,
    /// Free-form data; values may be any JSON value.
    pub personal_data: BTreeMap<String, Value>,
}

impl Student {
    pub fn new(
        login: impl Into<String>,
        credential: Credential,
        name: impl Into<String>,
        ra: impl Into<String>,
    ) -> Self {
        Self {
            identity: Identity::new(login, credential, name, Role::Student),
            ra: ra.into(),
            enrollments: BTreeMap::new(),
            grades: BTreeMap::new(),
            attendance: BTreeMap::new(),
            personal_data: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn login(&self) -> &str {
        &self.identity.login
    }

    #[must_use]
    pub fn is_enrolled(&self, course_id: &str) -> bool {
        self.enrollments.contains_key(course_id)
    }

    /// The stored address, when present and textual.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.personal_data.get(ADDRESS_KEY).and_then(Value::as_str)
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.personal_data.insert(ADDRESS_KEY.to_owned(), Value::String(address.into()));
    }

    #[must_use]
    pub fn average(&self, course_id: &str) -> f64 {
        calculate_average(self, course_id)
    }

    #[must_use]
    pub fn attendance_summary(&self, course_id: &str) -> AttendanceSummary {
        self.attendance.get(course_id).map_or_else(AttendanceSummary::default, |records| {
            AttendanceSummary::from_records(records)
        })
    }

    #[must_use]
    pub fn evaluate(&self, course_id: &str, policy: &GradingPolicy) -> Evaluation {
        evaluate_outcome(self, course_id, policy)
    }

    /// Drops every trace of `course_id` from this student.
    pub fn forget_course(&mut self, course_id: &str) {
        self.enrollments.remove(course_id);
        self.attendance.remove(course_id);
        self.grades.remove(course_id);
    }
}

/// Any user of the system.
#[derive(Debug, Clone, PartialEq)]
pub enum Account {
    Base(Identity),
    Teacher(Teacher),
    Student(Student),
}

impl Account {
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        match self {
            Self::Base(identity) => identity,
            Self::Teacher(teacher) => &teacher.identity,
            Self::Student(student) => &student.identity,
        }
    }

    #[must_use]
    pub fn login(&self) -> &str {
        &self.identity().login
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.identity().role
    }

    #[must_use]
    pub fn view(&self) -> AccountRef<'_> {
        match self {
            Self::Base(identity) => AccountRef::Base(identity),
            Self::Teacher(teacher) => AccountRef::Teacher(teacher),
            Self::Student(student) => AccountRef::Student(student),
        }
    }
}

/// Borrowed view of an account, resolved from whichever collection owns it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AccountRef<'a> {
    Base(&'a Identity),
    Teacher(&'a Teacher),
    Student(&'a Student),
}

impl<'a> AccountRef<'a> {
    #[must_use]
    pub const fn identity(self) -> &'a Identity {
        match self {
            Self::Base(identity) => identity,
            Self::Teacher(teacher) => &teacher.identity,
            Self::Student(student) => &student.identity,
        }
    }

    #[must_use]
    pub fn login(self) -> &'a str {
        &self.identity().login
    }

    #[must_use]
    pub fn name(self) -> &'a str {
        &self.identity().name
    }

    #[must_use]
    pub const fn role(self) -> Role {
        self.identity().role
    }
}
