//! Errors raised while talking to the platform gateway.

/// Gateway error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GatewayErrorKind {
    /// The gateway client has not been attached yet.
    #[display("Gateway not connected")]
    NotConnected,

    /// Serenity API error (HTTP, gateway, rate limit).
    #[display("Serenity API error: {_0}")]
    Serenity(String),

    /// Channel not known to the gateway.
    #[display("Channel not found: {_0}")]
    ChannelNotFound(u64),

    /// User not known to the gateway.
    #[display("User not found: {_0}")]
    UserNotFound(u64),

    /// Message not known to the gateway.
    #[display("Message not found: {_0}")]
    MessageNotFound(u64),

    /// A message could not be delivered.
    #[display("Message send failed: {_0}")]
    SendFailed(String),
}

/// Gateway error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Gateway Error: {} at line {} in {}", kind, line, file)]
pub struct GatewayError {
    kind: GatewayErrorKind,
    line: u32,
    file: &'static str,
}

impl GatewayError {
    /// Create a new GatewayError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GatewayErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GatewayErrorKind {
        &self.kind
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(feature = "discord")]
impl From<serenity::Error> for GatewayError {
    #[track_caller]
    fn from(err: serenity::Error) -> Self {
        GatewayError::new(GatewayErrorKind::Serenity(err.to_string()))
    }
}
