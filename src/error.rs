//! Configuration errors
//!
//! The simulation itself has no failure modes; a fatal collision is a
//! gameplay outcome. Only malformed tuning is reported as an error, and only
//! at load time.

/// Error returned when loading or validating [`crate::tuning::Tuning`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
