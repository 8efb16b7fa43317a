//! Read-only reports: a student's transcript and a teacher's class lists.

use crate::error::RecordsError;
use crate::system::Records;
use scholar_domain::{AttendanceSummary, Outcome};
use tracing::warn;

/// Shown instead of the course name when an enrolled course no longer exists.
pub const REMOVED_COURSE_NAME: &str = "Course removed";

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptLine {
    pub course_id: String,
    pub course_name: String,
    pub grades: Vec<f64>,
    pub average: f64,
    pub attendance: AttendanceSummary,
    pub attendance_percent: f64,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    Regular,
    Pending { failures: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub ra: String,
    pub name: String,
    pub lines: Vec<TranscriptLine>,
    pub standing: Standing,
}

/// A course taught by a teacher, with its enrolled students.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassList {
    pub course_id: String,
    pub course_name: String,
    pub members: Vec<ClassMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMember {
    pub ra: String,
    /// `None` when the roster names an RA with no student record.
    pub name: Option<String>,
}

impl Records {
    /// Evaluates every course student `ra` is enrolled in.
    ///
    /// # Errors
    /// [`RecordsError::Validation`] when the student does not exist.
    pub fn transcript(&self, ra: &str) -> Result<Transcript, RecordsError> {
        let student =
            self.students.get(ra).ok_or_else(|| RecordsError::invalid(format!("Student '{ra}' not found")))?;

        let lines: Vec<TranscriptLine> = student
            .enrollments
            .keys()
            .map(|course_id| {
                let evaluation = student.evaluate(course_id, self.policy());
                TranscriptLine {
                    course_id: course_id.clone(),
                    course_name: self
                        .courses
                        .get(course_id)
                        .map_or_else(|| REMOVED_COURSE_NAME.to_owned(), |c| c.name.clone()),
                    grades: student.grades.get(course_id).cloned().unwrap_or_default(),
                    average: evaluation.average,
                    attendance: student.attendance_summary(course_id),
                    attendance_percent: evaluation.attendance_percent,
                    outcome: evaluation.outcome,
                }
            })
            .collect();

        let failures = lines.iter().filter(|line| !line.outcome.is_pass()).count();
        let standing = if failures == 0 { Standing::Regular } else { Standing::Pending { failures } };

        Ok(Transcript { ra: student.ra.clone(), name: student.identity.name.clone(), lines, standing })
    }

    /// The courses taught by `teacher`, in assignment order. Course ids that no longer exist
    /// are skipped.
    ///
    /// # Errors
    /// [`RecordsError::Validation`] when `teacher` is not a teacher.
    pub fn class_lists(&self, teacher: &str) -> Result<Vec<ClassList>, RecordsError> {
        let teacher = self
            .teachers
            .get(teacher)
            .ok_or_else(|| RecordsError::invalid(format!("Teacher '{teacher}' not found")))?;

        let lists = teacher
            .courses
            .iter()
            .filter_map(|course_id| {
                let Some(course) = self.courses.get(course_id) else {
                    warn!(course_id = %course_id, teacher = teacher.login(), "Assigned course not found");
                    return None;
                };
                let members = course
                    .roster
                    .iter()
                    .map(|ra| ClassMember {
                        ra: ra.clone(),
                        name: self.students.get(ra).map(|s| s.identity.name.clone()),
                    })
                    .collect();
                Some(ClassList { course_id: course.id.clone(), course_name: course.name.clone(), members })
            })
            .collect();

        Ok(lists)
    }
}
