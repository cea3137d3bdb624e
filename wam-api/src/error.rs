use thiserror::Error;

/// Errors reported by a [`DeviceClient`](crate::DeviceClient)
///
/// These are passed through to callers unchanged; nothing in this workspace
/// retries on them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The device could not be reached
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The device did not answer in time
    #[error("Timed out after {0} ms")]
    Timeout(u64),

    /// The device answered with something that is not a valid response
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// The device rejected the call
    #[error("Device error: {0}")]
    DeviceError(String),

    /// The handle no longer refers to an open connection
    #[error("Connection closed")]
    Disconnected,
}

/// Errors raised while turning a logical command into an [`ApiCall`](crate::ApiCall)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid argument '{value}' for {command}: {reason}")]
    InvalidArgument {
        command: String,
        value: String,
        reason: String,
    },
}

impl CommandError {
    pub(crate) fn invalid(command: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            command: command.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;
