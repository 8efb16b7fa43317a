//! Course creation and the teacher-side operations: posting grades and taking attendance.

use crate::error::RecordsError;
use crate::system::Records;
use chrono::{Local, NaiveDateTime};
use scholar_domain::constants::ATTENDANCE_TIMESTAMP_FORMAT;
use scholar_domain::{AttendanceRecord, Course, Presence, validate_grade};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// What happened to the teacher requested by [`Records::create_course`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeacherAssignment {
    Assigned,
    /// No teacher was requested.
    Unassigned,
    /// The requested login is not a teacher; the course was created without one.
    TeacherNotFound { login: String },
}

impl Records {
    /// Creates a course, optionally assigning it to an existing teacher.
    ///
    /// # Errors
    /// [`RecordsError::Validation`] for a blank id or name, or an id already in use. Encoding
    /// failures of the following save are returned as well.
    pub async fn create_course(
        &mut self,
        id: &str,
        name: &str,
        teacher: Option<&str>,
    ) -> Result<TeacherAssignment, RecordsError> {
        if id.trim().is_empty() || name.trim().is_empty() {
            return Err(RecordsError::invalid("Course id and name cannot be empty"));
        }
        if self.courses.contains_key(id) {
            return Err(RecordsError::invalid(format!("Course '{id}' already exists")));
        }

        let requested = teacher.map(str::trim).filter(|login| !login.is_empty());
        let (course, assignment) = match requested.map(|login| (login, self.teachers.get_mut(login))) {
            Some((login, Some(teacher))) => {
                teacher.courses.push(id.to_owned());
                (Course::new(id, name, Some(login.to_owned())), TeacherAssignment::Assigned)
            },
            Some((login, None)) => {
                warn!(course_id = id, teacher = login, "Teacher not found, course created without one");
                (Course::new(id, name, None), TeacherAssignment::TeacherNotFound { login: login.to_owned() })
            },
            None => (Course::new(id, name, None), TeacherAssignment::Unassigned),
        };

        self.courses.insert(id.to_owned(), course);
        info!(course_id = id, "Course created");
        self.save().await?;
        Ok(assignment)
    }

    /// Appends `grade` for student `ra` in `course_id` and returns the new average.
    ///
    /// # Errors
    /// [`RecordsError::Validation`] when the teacher does not teach the course, the student is
    /// not on its roster, or the grade is outside `[0, 10]`. Encoding failures of the following
    /// save are returned as well.
    pub async fn post_grade(
        &mut self,
        teacher: &str,
        course_id: &str,
        ra: &str,
        grade: f64,
    ) -> Result<f64, RecordsError> {
        let course = self.taught_course(teacher, course_id)?;
        if !course.has_student(ra) {
            return Err(RecordsError::invalid(format!("Student '{ra}' is not enrolled in '{course_id}'")));
        }
        let grade = validate_grade(grade).map_err(|e| RecordsError::invalid(e.to_string()))?;

        let student = self
            .students
            .get_mut(ra)
            .ok_or_else(|| RecordsError::invalid(format!("Student '{ra}' not found")))?;
        student.grades.entry(course_id.to_owned()).or_default().push(grade);
        let average = student.average(course_id);

        info!(ra, course_id, grade, average, "Grade posted");
        self.save().await?;
        Ok(average)
    }

    /// Records one session of `course_id` stamped with the current local time.
    /// See [`record_attendance_at`](Self::record_attendance_at).
    ///
    /// # Errors
    /// As [`record_attendance_at`](Self::record_attendance_at).
    pub async fn record_attendance(
        &mut self,
        teacher: &str,
        course_id: &str,
        marks: &BTreeMap<String, Presence>,
    ) -> Result<usize, RecordsError> {
        self.record_attendance_at(teacher, course_id, marks, Local::now().naive_local()).await
    }

    /// Records one session held at `at`. Roster students without a mark, and roster RAs with no
    /// student record, are skipped. Saves only when at least one mark was recorded and returns
    /// how many were.
    ///
    /// # Errors
    /// [`RecordsError::Validation`] when the teacher does not teach the course or a mark names
    /// an RA that is not on the roster. Encoding failures of the following save are returned
    /// as well.
    pub async fn record_attendance_at(
        &mut self,
        teacher: &str,
        course_id: &str,
        marks: &BTreeMap<String, Presence>,
        at: NaiveDateTime,
    ) -> Result<usize, RecordsError> {
        let course = self.taught_course(teacher, course_id)?;
        if let Some(stray) = marks.keys().find(|ra| !course.has_student(ra)) {
            return Err(RecordsError::invalid(format!("Student '{stray}' is not enrolled in '{course_id}'")));
        }
        let roster = course.roster.clone();

        let timestamp = at.format(ATTENDANCE_TIMESTAMP_FORMAT).to_string();
        let mut recorded = 0;
        for ra in &roster {
            let (Some(student), Some(&presence)) = (self.students.get_mut(ra), marks.get(ra)) else {
                debug!(ra = %ra, course_id, "No attendance recorded");
                continue;
            };
            student
                .attendance
                .entry(course_id.to_owned())
                .or_default()
                .push(AttendanceRecord { timestamp: timestamp.clone(), presence });
            recorded += 1;
        }

        if recorded > 0 {
            info!(course_id, recorded, %timestamp, "Attendance recorded");
            self.save().await?;
        }
        Ok(recorded)
    }

    fn taught_course(&self, teacher: &str, course_id: &str) -> Result<&Course, RecordsError> {
        let teaches = self.teachers.get(teacher).is_some_and(|t| t.teaches(course_id));
        if !teaches {
            return Err(RecordsError::invalid(format!("Course '{course_id}' is not assigned to '{teacher}'")));
        }
        self.courses.get(course_id).ok_or_else(|| RecordsError::invalid(format!("Course '{course_id}' not found")))
    }
}
