use crate::cli::Command;
use anyhow::bail;
use scholar::domain::{AccountRef, Credential, Presence};
use scholar::records::{NewAccount, ProfileUpdate, Records, Standing, TeacherAssignment};
use std::collections::BTreeMap;
use std::io::Write;

const UNASSIGNED: &str = "Unassigned";

pub(crate) async fn run(records: &mut Records, command: Command, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Command::Accounts => {
            for account in records.accounts() {
                writeln!(out, "{:<16} {:<14} {}", account.login(), account.role(), account.name())?;
            }
        },
        Command::Courses => {
            for course in records.courses() {
                let teacher = course
                    .teacher
                    .as_deref()
                    .and_then(|login| records.teacher(login))
                    .map_or(UNASSIGNED, |t| t.identity.name.as_str());
                writeln!(out, "{:<10} {:<24} {:<20} {} student(s)", course.id, course.name, teacher, course.roster.len())?;
            }
        },
        Command::RegisterStudent { login, name, ra, password } => {
            records.register(NewAccount::Student { login, credential: Credential::new(password), name, ra }).await?;
            writeln!(out, "Student registered.")?;
        },
        Command::RegisterTeacher { login, name, password } => {
            records.register(NewAccount::Teacher { login, credential: Credential::new(password), name }).await?;
            writeln!(out, "Teacher registered.")?;
        },
        Command::RegisterUser { login, name, role, password } => {
            records.register(NewAccount::Staff { login, credential: Credential::new(password), name, role }).await?;
            writeln!(out, "User registered.")?;
        },
        Command::CreateCourse { id, name, teacher } => {
            match records.create_course(&id, &name, teacher.as_deref()).await? {
                TeacherAssignment::Assigned => writeln!(out, "Course {id} created and assigned.")?,
                TeacherAssignment::Unassigned => writeln!(out, "Course {id} created without a teacher.")?,
                TeacherAssignment::TeacherNotFound { login } => {
                    writeln!(out, "Warning: teacher {login} not found. Course {id} created without a teacher.")?;
                },
            }
        },
        Command::Enroll { ra, course } => {
            if !records.enroll(&ra, &course).await? {
                bail!("Enrollment failed: check the RA, the course id, or an existing enrollment");
            }
            writeln!(out, "Student {ra} enrolled in {course}.")?;
        },
        Command::Withdraw { ra, course } => {
            let (done, reason) = records.withdraw(&ra, &course).await?.into_parts();
            if !done {
                bail!(reason);
            }
            writeln!(out, "{reason}")?;
        },
        Command::Grade { teacher, course, ra, grade } => {
            let average = records.post_grade(&teacher, &course, &ra, grade).await?;
            writeln!(out, "Grade {grade:.1} posted. Current average: {average:.2}")?;
        },
        Command::Attend { teacher, course, present, absent } => {
            let marks: BTreeMap<String, Presence> = present
                .into_iter()
                .map(|ra| (ra, Presence::Present))
                .chain(absent.into_iter().map(|ra| (ra, Presence::Absent)))
                .collect();
            let recorded = records.record_attendance(&teacher, &course, &marks).await?;
            writeln!(out, "{recorded} attendance mark(s) recorded.")?;
        },
        Command::Profile { ra, name, password, address } => {
            let update = ProfileUpdate { name, credential: password.map(Credential::new), address };
            records.update_profile(&ra, update).await?;
            writeln!(out, "Profile updated.")?;
        },
        Command::Transcript { ra } => print_transcript(records, &ra, out)?,
        Command::Classes { teacher } => {
            let lists = records.class_lists(&teacher)?;
            if lists.is_empty() {
                writeln!(out, "No courses assigned.")?;
            }
            for list in lists {
                writeln!(out, "--- {} ({}) ---", list.course_name, list.course_id)?;
                if list.members.is_empty() {
                    writeln!(out, "No students enrolled.")?;
                }
                for member in list.members {
                    writeln!(out, " - RA: {} - {}", member.ra, member.name.as_deref().unwrap_or("(student not found)"))?;
                }
            }
        },
        Command::Login { login, password } => match records.authenticate(&login, &password) {
            Some(account) => writeln!(out, "Login succeeded. Role: {}", describe(account))?,
            None => bail!("Incorrect login or password"),
        },
    }
    Ok(())
}

fn print_transcript(records: &Records, ra: &str, out: &mut impl Write) -> anyhow::Result<()> {
    let transcript = records.transcript(ra)?;
    writeln!(out, "--- Transcript of {} (RA: {}) ---", transcript.name, transcript.ra)?;
    if transcript.lines.is_empty() {
        writeln!(out, "No enrollments.")?;
        return Ok(());
    }

    for line in &transcript.lines {
        writeln!(out, "\n{} ({})", line.course_name, line.course_id)?;
        writeln!(out, "   Grades: {:?}", line.grades)?;
        writeln!(
            out,
            "   Average: {:.2} | Attendance: {:.2}% ({} of {} sessions)",
            line.average, line.attendance_percent, line.attendance.presences, line.attendance.sessions
        )?;
        writeln!(out, "   Outcome: {}", line.outcome)?;
    }

    match transcript.standing {
        Standing::Regular => writeln!(out, "\nStanding: REGULAR")?,
        Standing::Pending { failures } => writeln!(out, "\nStanding: PENDING ({failures} failed course(s))")?,
    }
    Ok(())
}

fn describe(account: AccountRef<'_>) -> String {
    match account {
        AccountRef::Student(student) => format!("{} (RA {})", account.role(), student.ra),
        AccountRef::Base(_) | AccountRef::Teacher(_) => account.role().to_string(),
    }
}
