//! The [`Records`] store: the owned collections, the unified login index and whole-file
//! persistence.
//!
//! The whole state is written as one JSON document with four top-level maps:
//! `usuarios` (base identities by login), `professores` (teachers by login), `alunos`
//! (students by RA) and `disciplinas` (courses by id).

use crate::codec::{CodecRegistry, Decoded, Record, RecordRef};
use crate::error::{RecordsError, RecordsErrorExt};
use fxhash::FxHashSet;
use scholar_domain::constants::{
    DATA_FILE_NAME, DEFAULT_ADMIN_LOGIN, DEFAULT_ADMIN_NAME, DEFAULT_REGISTRAR_LOGIN, DEFAULT_REGISTRAR_NAME,
};
use scholar_domain::{AccountRef, Course, Credential, GradingPolicy, Identity, Role, Student, Teacher};
use scholar_storage::{Storage, StorageError};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

const INDENT: &[u8] = b"    ";
/// Appended to the records file name for the copy kept when a load discards stored data.
pub const BACKUP_SUFFIX: &str = ".corrupt";

/// One slot of the unified login index. Role accounts are resolved through the collection
/// that owns them.
#[derive(Debug, Clone, PartialEq)]
pub enum UserEntry {
    Base(Identity),
    Teacher,
    Student { ra: String },
}

/// Something [`Records::load`] had to work around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// No records file yet; the default accounts were installed.
    MissingFile,
    /// The file could not be read or decoded; the default accounts were installed.
    Unreadable { reason: String },
    /// The file had no `admin` account; both default accounts were added in memory.
    DefaultsRestored,
    /// A base identity took over a login that also belongs to a teacher or student.
    LoginShadowed { login: String },
    /// One stored entity could not be decoded or sat in the wrong section; the rest loaded.
    EntitySkipped { section: String, key: String, reason: String },
    /// The file as read was copied to `file` before any of it was discarded.
    BackedUp { file: String },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFile => f.write_str("records file not found, started with default accounts"),
            Self::Unreadable { reason } => {
                write!(f, "records file unreadable ({reason}), started with default accounts")
            },
            Self::DefaultsRestored => f.write_str("default accounts restored in memory"),
            Self::LoginShadowed { login } => {
                write!(f, "login '{login}' resolves to a base identity that shadows a role account")
            },
            Self::EntitySkipped { section, key, reason } => {
                write!(f, "entry '{key}' in '{section}' skipped ({reason})")
            },
            Self::BackedUp { file } => write!(f, "original records file copied to '{file}'"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub warnings: Vec<LoadWarning>,
}

impl LoadReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// `true` when the stored state was discarded in favour of the default dataset.
    #[must_use]
    pub fn used_defaults(&self) -> bool {
        self.warnings.iter().any(|w| matches!(w, LoadWarning::MissingFile | LoadWarning::Unreadable { .. }))
    }
}

/// Outcome of a save that did not fail on encoding.
#[derive(Debug)]
pub enum SaveReport {
    Persisted { bytes: usize },
    /// The write failed; the in-memory state is still authoritative.
    Retained { error: StorageError },
}

impl SaveReport {
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted { .. })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Document {
    usuarios: Map<String, Value>,
    professores: Map<String, Value>,
    alunos: Map<String, Value>,
    disciplinas: Map<String, Value>,
}

#[derive(Debug, Default)]
struct Collections {
    identities: Vec<Identity>,
    teachers: BTreeMap<String, Teacher>,
    students: BTreeMap<String, Student>,
    courses: BTreeMap<String, Course>,
}

/// The academic records system. Owns every entity; cross references are by key.
///
/// Every mutating operation takes `&mut self`, so one exclusive borrow spans its
/// load-mutate-save sequence. Share it between tasks only behind a lock.
#[derive(Debug)]
pub struct Records {
    storage: Storage,
    file_name: String,
    policy: GradingPolicy,
    codec: CodecRegistry,
    pub(crate) users: BTreeMap<String, UserEntry>,
    pub(crate) teachers: BTreeMap<String, Teacher>,
    pub(crate) students: BTreeMap<String, Student>,
    pub(crate) courses: BTreeMap<String, Course>,
}

impl Records {
    /// A store over `storage` holding the default accounts until [`load`](Self::load) runs.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        let mut records = Self {
            storage,
            file_name: DATA_FILE_NAME.to_owned(),
            policy: GradingPolicy::default(),
            codec: CodecRegistry::standard(),
            users: BTreeMap::new(),
            teachers: BTreeMap::new(),
            students: BTreeMap::new(),
            courses: BTreeMap::new(),
        };
        records.reset_to_defaults();
        records
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: GradingPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_codec(mut self, codec: CodecRegistry) -> Self {
        self.codec = codec;
        self
    }

    /// Loads the stored state, then saves it straight back so the file exists afterwards.
    ///
    /// # Errors
    /// Only encoding failures of the initial save are returned.
    pub async fn open(mut self) -> Result<(Self, LoadReport), RecordsError> {
        let report = self.load().await;
        self.save().await?;
        Ok((self, report))
    }

    /// Replaces the in-memory state with the stored one.
    ///
    /// Never fails. A missing, unreadable or malformed file leaves the default accounts in
    /// place. An entity that cannot be decoded is skipped and the rest of the file loads.
    /// Whenever stored data is discarded, the file as read is first copied next to it with
    /// [`BACKUP_SUFFIX`] appended. The returned report says what happened.
    pub async fn load(&mut self) -> LoadReport {
        let mut report = LoadReport::default();

        let bytes = match self.storage.read(&self.file_name).await {
            Ok(bytes) => bytes,
            Err(StorageError::FileNotFound { .. }) => {
                warn!(file = %self.file_name, "Records file not found, starting with default accounts");
                self.reset_to_defaults();
                report.warnings.push(LoadWarning::MissingFile);
                return report;
            },
            Err(e) => return self.fall_back(report, &e),
        };

        let collections = match self.decode_document(&bytes, &mut report) {
            Ok(collections) => collections,
            Err(e) => {
                self.back_up(&bytes, &mut report).await;
                return self.fall_back(report, &e);
            },
        };
        if report.warnings.iter().any(|w| matches!(w, LoadWarning::EntitySkipped { .. })) {
            self.back_up(&bytes, &mut report).await;
        }

        self.install(collections, &mut report);
        info!(
            file = %self.file_name,
            users = self.users.len(),
            teachers = self.teachers.len(),
            students = self.students.len(),
            courses = self.courses.len(),
            "Records loaded"
        );
        report
    }

    /// Writes the whole state as one document, replacing the previous file atomically.
    ///
    /// # Errors
    /// [`RecordsError::Serialization`] when an entity cannot be encoded. Storage failures are
    /// not errors: they are logged and reported as [`SaveReport::Retained`].
    pub async fn save(&self) -> Result<SaveReport, RecordsError> {
        let bytes = self.encode_document()?;

        match self.storage.write(&self.file_name, &bytes).await {
            Ok(()) => {
                debug!(file = %self.file_name, bytes = bytes.len(), "Records saved");
                Ok(SaveReport::Persisted { bytes: bytes.len() })
            },
            Err(error) => {
                warn!(file = %self.file_name, error = %error, "Failed to save records, keeping in-memory state");
                Ok(SaveReport::Retained { error })
            },
        }
    }

    #[must_use]
    pub const fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub const fn policy(&self) -> &GradingPolicy {
        &self.policy
    }

    #[must_use]
    pub const fn codec(&self) -> &CodecRegistry {
        &self.codec
    }

    /// Base identities held by the login index, in login order.
    pub fn identities(&self) -> impl Iterator<Item = &Identity> {
        self.users.values().filter_map(|entry| match entry {
            UserEntry::Base(identity) => Some(identity),
            UserEntry::Teacher | UserEntry::Student { .. } => None,
        })
    }

    pub fn teachers(&self) -> impl Iterator<Item = &Teacher> {
        self.teachers.values()
    }

    #[must_use]
    pub fn teacher(&self, login: &str) -> Option<&Teacher> {
        self.teachers.get(login)
    }

    pub fn students(&self) -> impl Iterator<Item = &Student> {
        self.students.values()
    }

    #[must_use]
    pub fn student(&self, ra: &str) -> Option<&Student> {
        self.students.get(ra)
    }

    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    #[must_use]
    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.get(id)
    }

    #[must_use]
    pub fn user_entry(&self, login: &str) -> Option<&UserEntry> {
        self.users.get(login)
    }

    /// Resolves `login` through the unified index.
    #[must_use]
    pub fn account(&self, login: &str) -> Option<AccountRef<'_>> {
        self.users.get(login).and_then(|entry| self.resolve(login, entry))
    }

    /// Every account reachable through the login index, in login order.
    pub fn accounts(&self) -> impl Iterator<Item = AccountRef<'_>> {
        self.users.iter().filter_map(|(login, entry)| self.resolve(login, entry))
    }

    fn resolve<'a>(&'a self, login: &str, entry: &'a UserEntry) -> Option<AccountRef<'a>> {
        match entry {
            UserEntry::Base(identity) => Some(AccountRef::Base(identity)),
            UserEntry::Teacher => self.teachers.get(login).map(AccountRef::Teacher),
            UserEntry::Student { ra } => self.students.get(ra).map(AccountRef::Student),
        }
    }

    fn fall_back(&mut self, mut report: LoadReport, error: &dyn fmt::Display) -> LoadReport {
        warn!(file = %self.file_name, error = %error, "Failed to load records, starting with default accounts");
        self.reset_to_defaults();
        report.warnings.push(LoadWarning::Unreadable { reason: error.to_string() });
        report
    }

    fn reset_to_defaults(&mut self) {
        self.users = default_identities()
            .into_iter()
            .map(|identity| (identity.login.clone(), UserEntry::Base(identity)))
            .collect();
        self.teachers.clear();
        self.students.clear();
        self.courses.clear();
    }

    async fn back_up(&self, bytes: &[u8], report: &mut LoadReport) {
        let backup = format!("{}{BACKUP_SUFFIX}", self.file_name);
        match self.storage.write(&backup, bytes).await {
            Ok(()) => {
                warn!(file = %backup, "Records file copied before discarding stored data");
                report.warnings.push(LoadWarning::BackedUp { file: backup });
            },
            Err(error) => warn!(file = %backup, error = %error, "Failed to back up records file"),
        }
    }

    /// Parses the document. Only a document that is not a JSON object of sections is an
    /// error; bad entries are skipped and reported.
    fn decode_document(&self, bytes: &[u8], report: &mut LoadReport) -> Result<Collections, RecordsError> {
        let document: Document = serde_json::from_slice(bytes).context("Parsing records file")?;
        let mut collections = Collections::default();

        for (key, value) in document.usuarios {
            match self.decode_entry("usuarios", &key, value, report) {
                Some(Record::Identity(identity)) => collections.identities.push(identity),
                Some(other) => skip(report, "usuarios", &key, &Decoded::Record(other)),
                None => {},
            }
        }
        for (key, value) in document.professores {
            match self.decode_entry("professores", &key, value, report) {
                Some(Record::Teacher(teacher)) => {
                    collections.teachers.insert(teacher.identity.login.clone(), teacher);
                },
                Some(other) => skip(report, "professores", &key, &Decoded::Record(other)),
                None => {},
            }
        }
        for (key, value) in document.alunos {
            match self.decode_entry("alunos", &key, value, report) {
                Some(Record::Student(student)) => {
                    collections.students.insert(student.ra.clone(), student);
                },
                Some(other) => skip(report, "alunos", &key, &Decoded::Record(other)),
                None => {},
            }
        }
        for (key, value) in document.disciplinas {
            match self.decode_entry("disciplinas", &key, value, report) {
                Some(Record::Course(course)) => {
                    collections.courses.insert(course.id.clone(), course);
                },
                Some(other) => skip(report, "disciplinas", &key, &Decoded::Record(other)),
                None => {},
            }
        }

        Ok(collections)
    }

    /// Decodes one entry; failures and untagged values are reported and yield `None`.
    fn decode_entry(&self, section: &str, key: &str, value: Value, report: &mut LoadReport) -> Option<Record> {
        match self.codec.decode(value) {
            Ok(Decoded::Record(record)) => Some(record),
            Ok(raw @ Decoded::Raw(_)) => {
                skip(report, section, key, &raw);
                None
            },
            Err(e) => {
                skip_with_reason(report, section, key, e.to_string());
                None
            },
        }
    }

    /// Rebuilds the login index: teachers, then students by login, then base identities,
    /// so a base identity wins any login collision.
    fn install(&mut self, collections: Collections, report: &mut LoadReport) {
        let mut users = BTreeMap::new();

        for login in collections.teachers.keys() {
            users.insert(login.clone(), UserEntry::Teacher);
        }
        for student in collections.students.values() {
            users.insert(student.login().to_owned(), UserEntry::Student { ra: student.ra.clone() });
        }
        for identity in collections.identities {
            if users.contains_key(&identity.login) {
                warn!(login = %identity.login, "Base identity shadows a teacher or student with the same login");
                report.warnings.push(LoadWarning::LoginShadowed { login: identity.login.clone() });
            }
            users.insert(identity.login.clone(), UserEntry::Base(identity));
        }

        if !users.contains_key(DEFAULT_ADMIN_LOGIN) {
            warn!("No '{DEFAULT_ADMIN_LOGIN}' account in records file, restoring default accounts in memory");
            for identity in default_identities() {
                users.insert(identity.login.clone(), UserEntry::Base(identity));
            }
            report.warnings.push(LoadWarning::DefaultsRestored);
        }

        self.users = users;
        self.teachers = collections.teachers;
        self.students = collections.students;
        self.courses = collections.courses;
    }

    fn encode_document(&self) -> Result<Vec<u8>, RecordsError> {
        let student_logins: FxHashSet<&str> = self.students.values().map(Student::login).collect();

        let base = self
            .users
            .iter()
            .filter_map(|(login, entry)| match entry {
                UserEntry::Base(identity) if identity.role.is_base() => Some((login, identity)),
                _ => None,
            })
            .filter(|(login, _)| !self.teachers.contains_key(*login) && !student_logins.contains(login.as_str()));

        let mut document = Map::new();
        document.insert("usuarios".to_owned(), self.encode_all(base)?);
        document.insert("professores".to_owned(), self.encode_all(&self.teachers)?);
        document.insert("alunos".to_owned(), self.encode_all(&self.students)?);
        document.insert("disciplinas".to_owned(), self.encode_all(&self.courses)?);

        let mut bytes = Vec::with_capacity(4096);
        let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(INDENT));
        Value::Object(document).serialize(&mut serializer).map_err(|e| RecordsError::Serialization {
            message: e.to_string().into(),
            context: Some("Writing records document".into()),
        })?;
        Ok(bytes)
    }

    fn encode_all<'a, I, R>(&self, entries: I) -> Result<Value, RecordsError>
    where
        I: IntoIterator<Item = (&'a String, R)>,
        R: Into<RecordRef<'a>>,
    {
        let mut map = Map::new();
        for (key, entity) in entries {
            map.insert(key.clone(), self.codec.encode(entity)?);
        }
        Ok(Value::Object(map))
    }
}

fn default_identities() -> [Identity; 2] {
    [
        Identity::new(DEFAULT_ADMIN_LOGIN, Credential::placeholder(), DEFAULT_ADMIN_NAME, Role::Administrator),
        Identity::new(DEFAULT_REGISTRAR_LOGIN, Credential::placeholder(), DEFAULT_REGISTRAR_NAME, Role::Registrar),
    ]
}

fn skip(report: &mut LoadReport, section: &str, key: &str, found: &Decoded) {
    let reason = match found {
        Decoded::Record(record) => format!("unexpected {} record", record.tag()),
        Decoded::Raw(_) => "untagged value".to_owned(),
    };
    skip_with_reason(report, section, key, reason);
}

fn skip_with_reason(report: &mut LoadReport, section: &str, key: &str, reason: String) {
    warn!(section, key, reason = %reason, "Skipping stored entry");
    report.warnings.push(LoadWarning::EntitySkipped {
        section: section.to_owned(),
        key: key.to_owned(),
        reason,
    });
}
