/// All error types that can occur when talking to a Hue bridge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to serialize data to JSON.
    #[error("failed to dump json: {0:?}")]
    JsonDump(serde_json::Error),

    /// Failed to deserialize JSON data.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// An HTTP request to the bridge failed at the transport level.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The bridge returned a structured error object.
    ///
    /// Type 101 means the link button has not been pressed yet; during
    /// pairing this is expected and retried until the deadline.
    #[error("bridge error {error_type}: {description}")]
    Bridge { error_type: u16, description: String },

    /// No credential is known for the bridge yet.
    ///
    /// This is a recoverable condition: discovery and state sync are
    /// blocked until pairing succeeds, nothing crashes.
    #[error("bridge {0} is not paired")]
    NotPaired(String),

    /// The persistence collaborator failed to read or write.
    #[error("store {action} error: {reason}")]
    Store { action: String, reason: String },

    /// The specified light is not tracked by the registry.
    #[error("light {0:?} not found")]
    LightNotFound(String),

    /// Failed to parse a hex color string.
    #[error("invalid color string: {0}")]
    InvalidColorString(String),
}

impl Error {
    /// Create a new bridge-reported error.
    pub fn bridge(error_type: u16, description: &str) -> Self {
        Error::Bridge {
            error_type,
            description: description.to_string(),
        }
    }

    /// Create a new store error.
    pub fn store(action: &str, reason: impl ToString) -> Self {
        Error::Store {
            action: action.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error means the link button has not been pressed.
    pub fn is_link_button(&self) -> bool {
        matches!(self, Error::Bridge { error_type: 101, .. })
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
