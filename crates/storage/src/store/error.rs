#![forbid(unsafe_code)]

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    /// The referenced session/thought/plan/step does not exist.
    NotFound(&'static str),
    /// Duplicate session id on create.
    AlreadyExists(&'static str),
    /// A revision/branch/dependency reference points outside the owning
    /// session or plan, or forward to a not-yet-created step.
    InvalidReference(&'static str),
    /// A mandatory field is missing/invalid, or a state transition is not
    /// allowed from the current status.
    ConstraintViolation(&'static str),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::AlreadyExists(entity) => write!(f, "{entity} already exists"),
            Self::InvalidReference(message) => write!(f, "invalid reference: {message}"),
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}
