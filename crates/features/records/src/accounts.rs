use crate::error::RecordsError;
use crate::system::{Records, UserEntry};
use scholar_domain::{Account, AccountRef, Credential, Identity, Role, Student, Teacher};
use tracing::{debug, info};

/// Input for [`Records::register`].
#[derive(Debug, Clone)]
pub enum NewAccount {
    /// An administrator or registrar.
    Staff { login: String, credential: Credential, name: String, role: Role },
    Teacher { login: String, credential: Credential, name: String },
    Student { login: String, credential: Credential, name: String, ra: String },
}

impl NewAccount {
    #[must_use]
    pub fn login(&self) -> &str {
        match self {
            Self::Staff { login, .. } | Self::Teacher { login, .. } | Self::Student { login, .. } => login,
        }
    }

    fn into_account(self) -> Result<Account, RecordsError> {
        let account = match self {
            Self::Staff { role, .. } if !role.is_base() => {
                return Err(RecordsError::invalid(format!(
                    "Role '{role}' needs its own account kind, not a staff account"
                )));
            },
            Self::Staff { login, credential, name, role } => {
                Account::Base(Identity::new(login, credential, name, role))
            },
            Self::Teacher { login, credential, name } => Account::Teacher(Teacher::new(login, credential, name)),
            Self::Student { login, credential, name, ra } => {
                Account::Student(Student::new(login, credential, name, ra))
            },
        };
        Ok(account)
    }
}

/// Changes requested by a student. `None` or blank fields keep the current value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub credential: Option<Credential>,
    pub address: Option<String>,
}

impl Records {
    /// Creates an account.
    ///
    /// # Errors
    /// [`RecordsError::Validation`] for blank fields, a login already in use anywhere in the
    /// user space, a student RA already registered, or a staff account with a role that has
    /// its own account kind. Encoding failures of the following save are returned as well.
    pub async fn register(&mut self, account: NewAccount) -> Result<(), RecordsError> {
        let account = account.into_account()?;
        let identity = account.identity();

        if identity.login.trim().is_empty() || identity.name.trim().is_empty() {
            return Err(RecordsError::invalid("Login and name cannot be empty"));
        }
        if self.users.contains_key(&identity.login) {
            return Err(RecordsError::invalid(format!("Login '{}' already exists", identity.login)));
        }

        let login = identity.login.clone();
        let role = identity.role;
        match account {
            Account::Base(identity) => {
                self.users.insert(login.clone(), UserEntry::Base(identity));
            },
            Account::Teacher(teacher) => {
                self.users.insert(login.clone(), UserEntry::Teacher);
                self.teachers.insert(login.clone(), teacher);
            },
            Account::Student(student) => {
                if student.ra.trim().is_empty() {
                    return Err(RecordsError::invalid("RA cannot be empty"));
                }
                if self.students.contains_key(&student.ra) {
                    return Err(RecordsError::invalid(format!("RA '{}' already registered", student.ra)));
                }
                self.users.insert(login.clone(), UserEntry::Student { ra: student.ra.clone() });
                self.students.insert(student.ra.clone(), student);
            },
        }

        info!(login = %login, %role, "Account registered");
        self.save().await?;
        Ok(())
    }

    /// Plaintext credential check against the unified index.
    #[must_use]
    pub fn authenticate(&self, login: &str, secret: &str) -> Option<AccountRef<'_>> {
        let account = self.account(login)?;
        if account.identity().credential.matches(secret) {
            Some(account)
        } else {
            debug!(login, "Authentication failed");
            None
        }
    }

    /// Applies `update` to student `ra`.
    ///
    /// # Errors
    /// [`RecordsError::Validation`] when the student does not exist, plus encoding failures
    /// of the following save.
    pub async fn update_profile(&mut self, ra: &str, update: ProfileUpdate) -> Result<(), RecordsError> {
        let student = self
            .students
            .get_mut(ra)
            .ok_or_else(|| RecordsError::invalid(format!("Student '{ra}' not found")))?;

        if let Some(name) = update.name.filter(|n| !n.trim().is_empty()) {
            student.identity.name = name;
        }
        if let Some(credential) = update.credential.filter(|c| !c.expose().is_empty()) {
            student.identity.credential = credential;
        }
        if let Some(address) = update.address.filter(|a| !a.trim().is_empty()) {
            student.set_address(address);
        }

        info!(ra, "Profile updated");
        self.save().await?;
        Ok(())
    }
}
