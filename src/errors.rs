/// All error types that can occur while bridging a Yeelight bulb.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The bulb could not be reached or rejected the request.
    #[error("communication error during {action}: {reason}")]
    Communication { action: String, reason: String },

    /// The bulb did not answer within the configured command timeout.
    #[error("{action} timed out")]
    Timeout { action: String },

    /// Failed to deserialize JSON data pushed by a bulb.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// Failed to parse a [`crate::Color`] from a string.
    #[error("invalid color string: {0}")]
    InvalidColorString(String),
}

impl Error {
    /// Create a new communication error
    pub fn communication(action: &str, reason: impl ToString) -> Self {
        Error::Communication {
            action: action.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a new timeout error
    pub fn timeout(action: &str) -> Self {
        Error::Timeout {
            action: action.to_string(),
        }
    }

    /// Whether this error means the bulb is unreachable.
    pub fn is_communication(&self) -> bool {
        matches!(self, Error::Communication { .. } | Error::Timeout { .. })
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
