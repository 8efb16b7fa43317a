use clap::{Parser, Subcommand};
use scholar::domain::Role;
use std::path::PathBuf;

/// Academic records administration.
#[derive(Debug, Parser)]
#[command(name = "registrar", version, about)]
pub(crate) struct Cli {
    /// Configuration file; `registrar.toml` in the working directory when omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List every account.
    Accounts,
    /// List courses with their teacher and head count.
    Courses,
    /// Register a student.
    RegisterStudent {
        #[arg(long)]
        login: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        ra: String,
        #[arg(long)]
        password: String,
    },
    /// Register a teacher.
    RegisterTeacher {
        #[arg(long)]
        login: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
    },
    /// Register an administrator or registrar account.
    RegisterUser {
        #[arg(long)]
        login: String,
        #[arg(long)]
        name: String,
        /// `administrador` or `secretaria`.
        #[arg(long)]
        role: Role,
        #[arg(long)]
        password: String,
    },
    /// Create a course, optionally assigned to a teacher.
    CreateCourse {
        id: String,
        name: String,
        #[arg(long)]
        teacher: Option<String>,
    },
    /// Enroll a student in a course.
    Enroll { ra: String, course: String },
    /// Cancel a student's enrollment.
    Withdraw { ra: String, course: String },
    /// Post a grade as the course's teacher.
    Grade {
        #[arg(long)]
        teacher: String,
        course: String,
        ra: String,
        grade: f64,
    },
    /// Record one session's attendance as the course's teacher.
    Attend {
        #[arg(long)]
        teacher: String,
        course: String,
        #[arg(long = "present", value_name = "RA")]
        present: Vec<String>,
        #[arg(long = "absent", value_name = "RA")]
        absent: Vec<String>,
    },
    /// Update a student's name, password or address.
    Profile {
        ra: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Print a student's transcript.
    Transcript { ra: String },
    /// Print a teacher's class lists.
    Classes { teacher: String },
    /// Check a login and password.
    Login { login: String, password: String },
}
