//! Extension lifecycle errors.

/// Why a single extension load or unload did not happen.
///
/// Every kind except [`Failed`](Self::Failed) and [`Escaped`](Self::Escaped)
/// is a module-system failure: the extension registry refused the operation
/// before any extension code ran.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ExtensionErrorKind {
    /// No extension with this name is registered.
    #[display("Extension '{}' could not be found", _0)]
    NotFound(String),

    /// The name lies outside the component namespace.
    #[display("Extension '{}' is outside the '{}' namespace", name, namespace)]
    InvalidNamespace {
        /// Offending extension name
        name: String,
        /// Namespace every extension must live under
        namespace: String,
    },

    /// The extension has no setup entry point.
    #[display("Extension '{}' has no setup function", _0)]
    NoEntryPoint(String),

    /// The extension is already in the active set.
    #[display("Extension '{}' is already loaded", _0)]
    AlreadyLoaded(String),

    /// The extension is not in the active set.
    #[display("Extension '{}' has not been loaded", _0)]
    NotLoaded(String),

    /// A load or unload of this extension is still running.
    #[display("Extension '{}' is already being loaded or unloaded", _0)]
    InProgress(String),

    /// The extension's own setup or teardown routine returned an error.
    #[display("Extension '{}' raised an error: {}", name, cause)]
    Failed {
        /// Extension name
        name: String,
        /// Rendered cause chain
        cause: String,
    },

    /// A panic escaped the per-extension boundary during bootstrap.
    #[display("Extension '{}' panicked during bootstrap: {}", name, detail)]
    Escaped {
        /// Extension name
        name: String,
        /// Panic payload, when it was a string
        detail: String,
    },
}

impl ExtensionErrorKind {
    /// True when the extension's own routine failed, as opposed to the
    /// registry refusing the operation.
    pub fn is_activation_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Escaped { .. })
    }
}

/// Extension error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Extension Error: {} at line {} in {}", kind, line, file)]
pub struct ExtensionError {
    kind: ExtensionErrorKind,
    line: u32,
    file: &'static str,
}

impl ExtensionError {
    /// Create a new extension error with caller location tracking.
    #[track_caller]
    pub fn new(kind: ExtensionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ExtensionErrorKind {
        &self.kind
    }

    /// Human-readable reason without location noise, suitable for replying
    /// to an operator.
    pub fn reason(&self) -> String {
        self.kind.to_string()
    }
}

/// Result type for extension operations.
pub type ExtensionResult<T> = Result<T, ExtensionError>;
