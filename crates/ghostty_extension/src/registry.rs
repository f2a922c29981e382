//! Compile-time extension registry and discovery.

use crate::{Component, ExtensionName};
use futures::future::BoxFuture;
use ghostty_error::{ExtensionError, ExtensionErrorKind, ExtensionResult};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Future returned by an extension's setup routine.
pub type SetupFuture = BoxFuture<'static, anyhow::Result<Vec<Arc<dyn Component>>>>;

/// Future returned by an extension's teardown routine.
pub type TeardownFuture = BoxFuture<'static, anyhow::Result<()>>;

/// Activation entry point of an extension, given the host context.
pub type SetupFn<C> = fn(Arc<C>) -> SetupFuture;

/// Deactivation entry point of an extension, given the host context.
pub type TeardownFn<C> = fn(Arc<C>) -> TeardownFuture;

/// Registration record of one extension.
pub struct ExtensionDescriptor<C> {
    name: ExtensionName,
    setup: Option<SetupFn<C>>,
    teardown: Option<TeardownFn<C>>,
}

impl<C> ExtensionDescriptor<C> {
    /// Describe an extension with no entry points yet.
    pub fn new(name: impl Into<ExtensionName>) -> Self {
        Self {
            name: name.into(),
            setup: None,
            teardown: None,
        }
    }

    /// Set the activation entry point.
    pub fn with_setup(mut self, setup: SetupFn<C>) -> Self {
        self.setup = Some(setup);
        self
    }

    /// Set the deactivation entry point.
    pub fn with_teardown(mut self, teardown: TeardownFn<C>) -> Self {
        self.teardown = Some(teardown);
        self
    }

    /// Extension name.
    pub fn name(&self) -> &ExtensionName {
        &self.name
    }

    /// Activation entry point, if the extension has one.
    pub fn setup(&self) -> Option<SetupFn<C>> {
        self.setup
    }

    /// Deactivation entry point, if the extension has one.
    pub fn teardown(&self) -> Option<TeardownFn<C>> {
        self.teardown
    }
}

impl<C> Clone for ExtensionDescriptor<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            setup: self.setup,
            teardown: self.teardown,
        }
    }
}

impl<C> std::fmt::Debug for ExtensionDescriptor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionDescriptor")
            .field("name", &self.name)
            .field("setup", &self.setup.is_some())
            .field("teardown", &self.teardown.is_some())
            .finish()
    }
}

/// Registry of every extension compiled into the binary.
///
/// Registration accepts anything; validity is decided by the discovery
/// predicate, so a malformed extension only shrinks the candidate set.
pub struct ExtensionRegistry<C> {
    namespace: String,
    descriptors: BTreeMap<ExtensionName, ExtensionDescriptor<C>>,
}

impl<C> ExtensionRegistry<C> {
    /// Create an empty registry whose extensions live under `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        tracing::debug!(namespace = %namespace, "Creating new ExtensionRegistry");
        Self {
            namespace,
            descriptors: BTreeMap::new(),
        }
    }

    /// Register an extension.
    ///
    /// If an extension with the same name already exists, it is replaced and
    /// a warning logged.
    #[tracing::instrument(skip(self, descriptor), fields(extension = %descriptor.name()))]
    pub fn register(&mut self, descriptor: ExtensionDescriptor<C>) -> &mut Self {
        if self.descriptors.contains_key(descriptor.name()) {
            tracing::warn!("Extension already registered, overwriting previous registration");
        } else {
            tracing::debug!("Registering extension");
        }
        self.descriptors
            .insert(descriptor.name().clone(), descriptor);
        self
    }

    /// Namespace every valid extension lives under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Look up a registration regardless of validity.
    pub fn get(&self, name: &str) -> Option<&ExtensionDescriptor<C>> {
        self.descriptors.get(name)
    }

    /// Apply the discovery predicate to one name.
    ///
    /// # Errors
    ///
    /// - `InvalidNamespace` if the name is outside the component namespace
    /// - `NotFound` if nothing is registered under the name
    /// - `NoEntryPoint` if the registration has no setup function
    pub fn validate(&self, name: &str) -> ExtensionResult<&ExtensionDescriptor<C>> {
        if !name.starts_with(&self.namespace) {
            return Err(ExtensionError::new(ExtensionErrorKind::InvalidNamespace {
                name: name.to_string(),
                namespace: self.namespace.clone(),
            }));
        }
        let descriptor = self.get(name).ok_or_else(|| {
            ExtensionError::new(ExtensionErrorKind::NotFound(name.to_string()))
        })?;
        if descriptor.setup().is_none() {
            return Err(ExtensionError::new(ExtensionErrorKind::NoEntryPoint(
                name.to_string(),
            )));
        }
        Ok(descriptor)
    }

    /// Standalone validity check, for operator-facing commands.
    pub fn is_valid_extension(&self, name: &str) -> bool {
        self.validate(name).is_ok()
    }

    /// Every registered extension that passes the discovery predicate.
    pub fn discover(&self) -> BTreeSet<ExtensionName> {
        self.descriptors
            .keys()
            .filter(|name| self.is_valid_extension(name))
            .cloned()
            .collect()
    }

    /// Name with the namespace stripped.
    pub fn short_name<'a>(&self, name: &'a str) -> &'a str {
        name.strip_prefix(self.namespace.as_str()).unwrap_or(name)
    }

    /// Number of registrations, valid or not.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
