//! Startup configuration errors.
//!
//! Raised while loading or validating the bot's settings, before any
//! connection to the platform is attempted.

/// Reasons a configuration is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// The layered sources could not be merged.
    #[display("Failed to build configuration: {}", _0)]
    Build(String),

    /// The merged sources did not deserialize into the settings struct.
    #[display("Failed to parse configuration: {}", _0)]
    Parse(String),

    /// No bot token was supplied.
    #[display("BOT_TOKEN is empty")]
    EmptyToken,

    /// A message filter pattern is not a valid regex.
    #[display("Invalid regex pattern '{}': {}", pattern, reason)]
    InvalidPattern {
        /// Offending pattern
        pattern: String,
        /// Compiler message
        reason: String,
    },
}

/// Configuration error with location tracking.
///
/// # Examples
///
/// ```
/// use ghostty_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::EmptyToken);
/// assert_eq!(err.kind(), &ConfigErrorKind::EmptyToken);
/// assert!(err.to_string().contains("BOT_TOKEN is empty"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    kind: ConfigErrorKind,
    line: u32,
    file: &'static str,
}

impl ConfigError {
    /// Create a new configuration error with caller location tracking.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }
}
