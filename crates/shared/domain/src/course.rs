/// A course offering. The teacher reference is a login and may dangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub teacher: Option<String>,
    /// RAs of enrolled students, in enrollment order and without duplicates.
    pub roster: Vec<String>,
}

impl Course {
    pub fn new(id: impl Into<String>, name: impl Into<String>, teacher: Option<String>) -> Self {
        Self { id: id.into(), name: name.into(), teacher, roster: Vec::new() }
    }

    #[must_use]
    pub fn has_student(&self, ra: &str) -> bool {
        self.roster.iter().any(|r| r == ra)
    }

    #[must_use]
    pub fn is_taught_by(&self, login: &str) -> bool {
        self.teacher.as_deref() == Some(login)
    }

    /// Appends `ra` unless already present. Returns whether the roster changed.
    pub fn admit(&mut self, ra: &str) -> bool {
        if self.has_student(ra) {
            return false;
        }
        self.roster.push(ra.to_owned());
        true
    }

    /// Removes `ra`. Returns whether it was on the roster.
    pub fn dismiss(&mut self, ra: &str) -> bool {
        let before = self.roster.len();
        self.roster.retain(|r| r != ra);
        self.roster.len() != before
    }
}
