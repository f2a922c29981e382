//! Extension identifiers.

/// Stable identifier of an extension: its module path.
///
/// Equality is exact string match.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::Display,
    derive_more::From,
    derive_more::Deref,
)]
pub struct ExtensionName(String);

impl ExtensionName {
    /// Create a name from a module path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The full module path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path with `namespace` stripped, for log lines.
    pub fn short<'a>(&'a self, namespace: &str) -> &'a str {
        self.0.strip_prefix(namespace).unwrap_or(&self.0)
    }
}

impl From<&str> for ExtensionName {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl std::borrow::Borrow<str> for ExtensionName {
    fn borrow(&self) -> &str {
        &self.0
    }
}
