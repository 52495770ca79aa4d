use std::fmt;

/// Failure of a single router handler. Each variant maps to one user-facing
/// outcome at the dispatch boundary.
#[derive(Debug)]
pub enum BotError {
    /// Backend unreachable or statement error.
    Store(sqlx::Error),
    /// Non-admin invoked an admin action.
    Forbidden,
    /// Booking id no longer exists (already cancelled, stale button).
    NotFound(i64),
    /// Button payload that does not parse into a known action.
    InvalidPayload(String),
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(e) => write!(f, "store failure: {e}"),
            Self::Forbidden => write!(f, "admin action denied"),
            Self::NotFound(id) => write!(f, "booking {id} not found"),
            Self::InvalidPayload(data) => write!(f, "invalid callback payload: {data:?}"),
        }
    }
}

impl std::error::Error for BotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for BotError {
    fn from(err: sqlx::Error) -> Self {
        Self::Store(err)
    }
}

/// An outgoing message that could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendError {
    pub chat_id: i64,
    pub detail: String,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "send to {} failed: {}", self.chat_id, self.detail)
    }
}

impl std::error::Error for SendError {}
