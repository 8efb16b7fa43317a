//! Enrolling students into courses and withdrawing them again.
//!
//! A (student, course) pair is either unenrolled or enrolled. Enrolling adds the RA to the
//! course roster and the course to the student's enrollments; withdrawing undoes both and
//! also drops the grades and attendance recorded for that course.

use crate::error::RecordsError;
use crate::system::Records;
use scholar_domain::Enrollment;
use tracing::{debug, info};

/// Result of [`Records::withdraw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Withdrawal {
    Withdrawn,
    StudentNotFound,
    CourseNotFound,
    NotEnrolled,
}

impl Withdrawal {
    #[must_use]
    pub const fn is_withdrawn(self) -> bool {
        matches!(self, Self::Withdrawn)
    }

    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Withdrawn => "Enrollment cancelled.",
            Self::StudentNotFound => "Student not found.",
            Self::CourseNotFound => "Course not found.",
            Self::NotEnrolled => "Student is not enrolled in this course.",
        }
    }

    /// The `(succeeded, reason)` pair.
    #[must_use]
    pub const fn into_parts(self) -> (bool, &'static str) {
        (self.is_withdrawn(), self.reason())
    }
}

impl Records {
    /// Enrolls student `ra` in `course_id`.
    ///
    /// Returns `Ok(false)` without touching anything when the student or the course does not
    /// exist, or the student is already on the roster.
    ///
    /// # Errors
    /// Only encoding failures of the following save.
    pub async fn enroll(&mut self, ra: &str, course_id: &str) -> Result<bool, RecordsError> {
        let (Some(student), Some(course)) = (self.students.get_mut(ra), self.courses.get_mut(course_id)) else {
            debug!(ra, course_id, "Enrollment rejected: unknown student or course");
            return Ok(false);
        };

        if !course.admit(ra) {
            debug!(ra, course_id, "Enrollment rejected: already on roster");
            return Ok(false);
        }
        student.enrollments.insert(course_id.to_owned(), Enrollment::enrolled());

        info!(ra, course_id, "Student enrolled");
        self.save().await?;
        Ok(true)
    }

    /// Withdraws student `ra` from `course_id`, checking in order that the student exists,
    /// the course exists and the student is enrolled.
    ///
    /// # Errors
    /// Only encoding failures of the following save.
    pub async fn withdraw(&mut self, ra: &str, course_id: &str) -> Result<Withdrawal, RecordsError> {
        let Some(student) = self.students.get_mut(ra) else {
            return Ok(Withdrawal::StudentNotFound);
        };
        let Some(course) = self.courses.get_mut(course_id) else {
            return Ok(Withdrawal::CourseNotFound);
        };
        if !student.is_enrolled(course_id) {
            return Ok(Withdrawal::NotEnrolled);
        }

        student.forget_course(course_id);
        course.dismiss(ra);

        info!(ra, course_id, "Student withdrawn");
        self.save().await?;
        Ok(Withdrawal::Withdrawn)
    }
}
