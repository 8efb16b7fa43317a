//! Grading rules: per-course averages, attendance ratios and the pass/fail decision.
//!
//! Failing on attendance takes precedence over failing on grade.

use crate::account::{AttendanceRecord, Presence, Student};
use crate::constants::{MAX_GRADE, MIN_GRADE, MINIMUM_ATTENDANCE, PASSING_AVERAGE};
use serde::Deserialize;
use std::fmt;

/// Thresholds for [`evaluate_outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GradingPolicy {
    pub passing_average: f64,
    /// Percentage in `[0, 100]`.
    pub minimum_attendance: f64,
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self { passing_average: PASSING_AVERAGE, minimum_attendance: MINIMUM_ATTENDANCE }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Passed,
    FailedGrade,
    FailedAttendance,
}

impl Outcome {
    #[must_use]
    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Passed)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::FailedGrade => "FAILED (GRADE)",
            Self::FailedAttendance => "FAILED (ATTENDANCE)",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttendanceSummary {
    pub sessions: usize,
    pub presences: usize,
    pub absences: usize,
}

impl AttendanceSummary {
    #[must_use]
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        let presences = records.iter().filter(|r| r.presence == Presence::Present).count();
        Self { sessions: records.len(), presences, absences: records.len() - presences }
    }

    /// Presences over sessions as a percentage; a course with no sessions counts as 100.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.sessions == 0 {
            return 100.0;
        }
        self.presences as f64 / self.sessions as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub outcome: Outcome,
    pub attendance_percent: f64,
    pub average: f64,
}

impl Evaluation {
    #[must_use]
    pub const fn into_parts(self) -> (Outcome, f64, f64) {
        (self.outcome, self.attendance_percent, self.average)
    }
}

/// Mean of the student's grades in `course_id`; `0.0` without grades.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn calculate_average(student: &Student, course_id: &str) -> f64 {
    match student.grades.get(course_id) {
        Some(grades) if !grades.is_empty() => grades.iter().sum::<f64>() / grades.len() as f64,
        _ => 0.0,
    }
}

#[must_use]
pub fn evaluate_outcome(student: &Student, course_id: &str, policy: &GradingPolicy) -> Evaluation {
    let average = calculate_average(student, course_id);
    let attendance_percent = student.attendance_summary(course_id).percent();

    let outcome = if attendance_percent < policy.minimum_attendance {
        Outcome::FailedAttendance
    } else if average < policy.passing_average {
        Outcome::FailedGrade
    } else {
        Outcome::Passed
    };

    Evaluation { outcome, attendance_percent, average }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeOutOfRange(pub f64);

impl fmt::Display for GradeOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grade {} is outside [{MIN_GRADE}, {MAX_GRADE}]", self.0)
    }
}

impl std::error::Error for GradeOutOfRange {}

/// Accepts finite grades in `[0, 10]`.
///
/// # Errors
/// Returns [`GradeOutOfRange`] for anything else, including `NaN`.
pub fn validate_grade(grade: f64) -> Result<f64, GradeOutOfRange> {
    if grade.is_finite() && (MIN_GRADE..=MAX_GRADE).contains(&grade) { Ok(grade) } else { Err(GradeOutOfRange(grade)) }
}
