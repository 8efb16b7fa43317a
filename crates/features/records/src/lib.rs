//! # Academic records
//!
//! The persistence and consistency core of Scholar. A [`Records`] store owns all teachers,
//! students, courses and base identities, keeps the course rosters and student enrollments in
//! step, and saves the whole state as one tagged JSON document through
//! [`scholar_storage::Storage`].
//!
//! ```rust,no_run
//! use scholar_records::Records;
//! use scholar_storage::Storage;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Storage::builder().root("data").connect().await?;
//! let (mut records, report) = Records::new(storage).open().await?;
//! for warning in &report.warnings {
//!     eprintln!("{warning}");
//! }
//!
//! if records.enroll("1001", "MAT101").await? {
//!     let transcript = records.transcript("1001")?;
//!     println!("{:?}", transcript.standing);
//! }
//! # Ok(())
//! # }
//! ```

mod accounts;
pub mod codec;
mod enrollment;
mod error;
mod system;
mod teaching;
mod transcript;

pub use accounts::{NewAccount, ProfileUpdate};
pub use codec::{CodecRegistry, Decoded, Record, RecordRef, Rule, Tag};
pub use enrollment::Withdrawal;
pub use error::{RecordsError, RecordsErrorExt};
pub use scholar_domain::{calculate_average, evaluate_outcome};
pub use system::{BACKUP_SUFFIX, LoadReport, LoadWarning, Records, SaveReport, UserEntry};
pub use teaching::TeacherAssignment;
pub use transcript::{ClassList, ClassMember, REMOVED_COURSE_NAME, Standing, Transcript, TranscriptLine};
