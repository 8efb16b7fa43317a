//! # Domain Models
//!
//! Pure academic types with a single dependency (`serde`). Keep it lean: no I/O and no
//! persistence format here, just data, invariant-preserving helpers and the grading rules.

pub mod account;
pub mod config;
pub mod constants;
pub mod course;
pub mod grading;

pub use account::{
    Account, AccountRef, AttendanceRecord, Credential, Enrollment, EnrollmentStatus, Identity, ParseRoleError, Presence,
    Role, Student, Teacher,
};
pub use course::Course;
pub use grading::{
    AttendanceSummary, Evaluation, GradeOutOfRange, GradingPolicy, Outcome, calculate_average, evaluate_outcome,
    validate_grade,
};
