//! Resource resolution errors.
//!
//! These represent configuration defects that only become visible once the
//! gateway is ready, so they surface on first access of a cached resource.

/// Resource resolution failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ResourceErrorKind {
    /// A resource was queried before the gateway signalled readiness.
    #[display("{} queried before the gateway was ready", _0)]
    NotReady(&'static str),

    /// The client is not a member of any guild.
    #[display("Bot is not a member of any guild")]
    NoGuilds,

    /// A configured channel id did not resolve.
    #[display("Failed to find {} (ID: {})", resource, id)]
    ChannelNotFound {
        /// Resource being resolved
        resource: &'static str,
        /// Configured channel id
        id: u64,
    },

    /// A configured channel resolved to the wrong channel kind.
    #[display("Expected {} to be a {} channel, found {}", resource, expected, found)]
    ChannelKindMismatch {
        /// Resource being resolved
        resource: &'static str,
        /// Expected channel kind
        expected: String,
        /// Actual channel kind
        found: String,
    },

    /// A webhook feed channel is absent from the primary guild.
    #[display("Failed to find {} webhook channel", _0)]
    WebhookChannelMissing(String),

    /// A webhook feed channel is not a text channel.
    #[display("Expected {} webhook channel to be a text channel", _0)]
    WebhookChannelNotText(String),
}

/// Resource error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Resource Error: {} at line {} in {}", kind, line, file)]
pub struct ResourceError {
    kind: ResourceErrorKind,
    line: u32,
    file: &'static str,
}

impl ResourceError {
    /// Create a new resource error with caller location tracking.
    #[track_caller]
    pub fn new(kind: ResourceErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ResourceErrorKind {
        &self.kind
    }
}

/// Result type for resource resolution.
pub type ResourceResult<T> = Result<T, ResourceError>;
