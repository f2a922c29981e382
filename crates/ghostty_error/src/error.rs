//! Top-level error wrapper types.

use crate::{ConfigError, ExtensionError, GatewayError, ResourceError};

/// Union of every error the bot runtime raises.
///
/// # Examples
///
/// ```
/// use ghostty_error::{GhosttyError, GatewayError, GatewayErrorKind};
///
/// let err: GhosttyError = GatewayError::new(GatewayErrorKind::NotConnected).into();
/// assert!(format!("{}", err).contains("Gateway not connected"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum GhosttyErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Gateway error
    #[from(GatewayError)]
    Gateway(GatewayError),
    /// Extension lifecycle error
    #[from(ExtensionError)]
    Extension(ExtensionError),
    /// Resource resolution error
    #[from(ResourceError)]
    Resource(ResourceError),
}

/// Ghostty bot error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Ghostty Bot Error: {}", _0)]
pub struct GhosttyError(Box<GhosttyErrorKind>);

impl GhosttyError {
    /// Create a new error from a kind.
    pub fn new(kind: GhosttyErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GhosttyErrorKind {
        &self.0
    }
}

impl<T> From<T> for GhosttyError
where
    T: Into<GhosttyErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Ghostty bot operations.
pub type GhosttyResult<T> = std::result::Result<T, GhosttyError>;
