//! Crate-wide error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A record could not be written to (or removed from) the key-value store.
    #[error("storage failure on {key}: {message}")]
    Storage { key: String, message: String },

    /// A session was started while another one is still active.
    #[error("a {active} session is already active")]
    Conflict { active: &'static str },

    /// An imported snapshot is malformed or incomplete.
    #[error("invalid snapshot: {0}")]
    Validation(String),

    /// A unit, level or boss id that does not follow the id grammar.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("no active session")]
    NoActiveSession,

    #[error("the active session is not a {0} session")]
    WrongSessionKind(&'static str),

    #[error("stage {0} is locked")]
    Locked(String),

    #[error("no hit points left")]
    OutOfHitPoints,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Stable tag for the route layer's JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Storage { .. } => "storage",
            Error::Conflict { .. } => "conflict",
            Error::Validation(_) => "validation",
            Error::InvalidId(_) => "invalid_id",
            Error::NoActiveSession => "no_active_session",
            Error::WrongSessionKind(_) => "wrong_session_kind",
            Error::Locked(_) => "locked",
            Error::OutOfHitPoints => "out_of_hit_points",
            Error::NotFound(_) => "not_found",
            Error::InvalidInput(_) => "invalid_input",
            Error::Json(_) => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_the_active_kind() {
        let err = Error::Conflict { active: "quiz" };
        assert_eq!(err.to_string(), "a quiz session is already active");
        assert_eq!(err.kind(), "conflict");
    }

    #[test]
    fn json_errors_convert() {
        let err: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.kind(), "json");
    }
}
