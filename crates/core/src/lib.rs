#![forbid(unsafe_code)]

pub mod ids {
    const MAX_ID_LEN: usize = 100;

    /// Caller-generated handle for one reasoning episode.
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct SessionId(String);

    impl SessionId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, IdError> {
            let value = value.into();
            validate_id(&value)?;
            Ok(Self(value))
        }
    }

    /// Name of an alternative continuation path within a session.
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct BranchId(String);

    impl BranchId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, IdError> {
            let value = value.into();
            validate_id(&value)?;
            Ok(Self(value))
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum IdError {
        Empty,
        TooLong,
        InvalidChar { ch: char, index: usize },
    }

    impl std::fmt::Display for IdError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::Empty => write!(f, "identifier is empty"),
                Self::TooLong => write!(f, "identifier exceeds {MAX_ID_LEN} chars"),
                Self::InvalidChar { ch, index } => {
                    write!(f, "invalid char {ch:?} at index {index}")
                }
            }
        }
    }

    impl std::error::Error for IdError {}

    fn validate_id(value: &str) -> Result<(), IdError> {
        if value.is_empty() {
            return Err(IdError::Empty);
        }
        if value.chars().count() > MAX_ID_LEN {
            return Err(IdError::TooLong);
        }
        for (index, ch) in value.chars().enumerate() {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '/' | '-' | ':') {
                continue;
            }
            return Err(IdError::InvalidChar { ch, index });
        }
        Ok(())
    }
}

pub mod model {
    /// Lifecycle of a reasoning session. `Abandoned` is reachable only by
    /// out-of-band administrative writes.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum SessionStatus {
        Active,
        Completed,
        Abandoned,
    }

    impl SessionStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                SessionStatus::Active => "active",
                SessionStatus::Completed => "completed",
                SessionStatus::Abandoned => "abandoned",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value {
                "active" => Some(SessionStatus::Active),
                "completed" => Some(SessionStatus::Completed),
                "abandoned" => Some(SessionStatus::Abandoned),
                _ => None,
            }
        }
    }

    /// Lifecycle of a single thought. `active ⇄ paused` via pause/resume,
    /// `active/paused → completed` via session completion (one-way).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum ThoughtStatus {
        Active,
        Completed,
        Paused,
        Abandoned,
    }

    impl ThoughtStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                ThoughtStatus::Active => "active",
                ThoughtStatus::Completed => "completed",
                ThoughtStatus::Paused => "paused",
                ThoughtStatus::Abandoned => "abandoned",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value {
                "active" => Some(ThoughtStatus::Active),
                "completed" => Some(ThoughtStatus::Completed),
                "paused" => Some(ThoughtStatus::Paused),
                "abandoned" => Some(ThoughtStatus::Abandoned),
                _ => None,
            }
        }

        /// States a pause or resume may start from.
        pub fn is_suspendable(self) -> bool {
            matches!(self, ThoughtStatus::Active | ThoughtStatus::Paused)
        }
    }

    /// Lifecycle of an execution plan. `in_progress` and `completed` are
    /// derived from step completion, never set directly by callers.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum PlanStatus {
        Draft,
        Ready,
        InProgress,
        Completed,
        Abandoned,
    }

    impl PlanStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                PlanStatus::Draft => "draft",
                PlanStatus::Ready => "ready",
                PlanStatus::InProgress => "in_progress",
                PlanStatus::Completed => "completed",
                PlanStatus::Abandoned => "abandoned",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value {
                "draft" => Some(PlanStatus::Draft),
                "ready" => Some(PlanStatus::Ready),
                "in_progress" => Some(PlanStatus::InProgress),
                "completed" => Some(PlanStatus::Completed),
                "abandoned" => Some(PlanStatus::Abandoned),
                _ => None,
            }
        }
    }
}
