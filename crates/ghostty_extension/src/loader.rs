//! Extension activation, deactivation and bootstrap fan-out.

use crate::{Component, ExtensionName, ExtensionRegistry};
use futures::FutureExt;
use futures::future::join_all;
use ghostty_error::{ExtensionError, ExtensionErrorKind, ExtensionResult};
use ghostty_gateway::Account;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// A single lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    /// Activate an extension.
    Load,
    /// Deactivate an extension.
    Unload,
}

/// Result of one load or unload attempt.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The active set changed as requested.
    Success,
    /// The active set is unchanged.
    Failure(ExtensionError),
}

impl LoadOutcome {
    /// Whether the operation took effect.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&ExtensionError> {
        match self {
            Self::Success => None,
            Self::Failure(err) => Some(err),
        }
    }
}

struct LoadedExtension {
    components: Vec<Arc<dyn Component>>,
}

/// Marks an extension as mid-operation until dropped, including on unwind.
struct PendingGuard<'a> {
    pending: &'a Mutex<BTreeSet<ExtensionName>>,
    name: ExtensionName,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.name);
    }
}

/// Owns the active set and performs every load and unload.
///
/// An extension is *loaded* exactly when its name is in the active set. A
/// load inserts only after setup succeeded and an unload removes only after
/// teardown succeeded, so callers never observe a half-applied operation.
///
/// The active set is shared process-wide. Any operation may suspend, and
/// other loads or unloads may run in the meantime; callers must re-query
/// instead of assuming the set is unchanged across an await.
pub struct ExtensionLoader<C> {
    registry: ExtensionRegistry<C>,
    active: RwLock<BTreeMap<ExtensionName, LoadedExtension>>,
    pending: Mutex<BTreeSet<ExtensionName>>,
}

impl<C> ExtensionLoader<C>
where
    C: Send + Sync + 'static,
{
    /// Create a loader over a registry with nothing active.
    pub fn new(registry: ExtensionRegistry<C>) -> Self {
        Self {
            registry,
            active: RwLock::new(BTreeMap::new()),
            pending: Mutex::new(BTreeSet::new()),
        }
    }

    /// The registry this loader draws from.
    pub fn registry(&self) -> &ExtensionRegistry<C> {
        &self.registry
    }

    /// Whether an extension is in the active set.
    pub fn is_active(&self, name: &str) -> bool {
        self.active.read().contains_key(name)
    }

    /// Names in the active set, sorted.
    pub fn active(&self) -> Vec<ExtensionName> {
        self.active.read().keys().cloned().collect()
    }

    /// Size of the active set.
    pub fn len(&self) -> usize {
        self.active.read().len()
    }

    /// Whether the active set is empty.
    pub fn is_empty(&self) -> bool {
        self.active.read().is_empty()
    }

    /// Every component contributed by an active extension.
    ///
    /// Returns a snapshot, so no lock is held while callers await on it.
    pub fn components(&self) -> Vec<Arc<dyn Component>> {
        self.active
            .read()
            .values()
            .flat_map(|loaded| loaded.components.iter().cloned())
            .collect()
    }

    /// Find an active component by its component name.
    pub fn component(&self, name: &str) -> Option<Arc<dyn Component>> {
        self.active
            .read()
            .values()
            .flat_map(|loaded| loaded.components.iter())
            .find(|component| component.name() == name)
            .cloned()
    }

    fn begin(&self, operation: Operation, name: &str) -> ExtensionResult<PendingGuard<'_>> {
        let mut pending = self.pending.lock();
        let active = self.is_active(name);
        match operation {
            Operation::Load if active => {
                return Err(ExtensionError::new(ExtensionErrorKind::AlreadyLoaded(
                    name.to_string(),
                )));
            }
            Operation::Unload if !active && !pending.contains(name) => {
                return Err(ExtensionError::new(ExtensionErrorKind::NotLoaded(
                    name.to_string(),
                )));
            }
            _ => {}
        }
        if pending.contains(name) {
            return Err(ExtensionError::new(ExtensionErrorKind::InProgress(
                name.to_string(),
            )));
        }
        if operation == Operation::Load {
            self.registry.validate(name)?;
        }
        let name = ExtensionName::new(name);
        pending.insert(name.clone());
        Ok(PendingGuard {
            pending: &self.pending,
            name,
        })
    }

    /// Activate one extension.
    ///
    /// Runs inside a `bot.load_extension` span named after the extension.
    ///
    /// # Errors
    ///
    /// - `AlreadyLoaded`, `InProgress`, `InvalidNamespace`, `NotFound`,
    ///   `NoEntryPoint` from the registry
    /// - `Failed` if the setup routine returned an error
    pub async fn load(&self, host: Arc<C>, name: &str) -> ExtensionResult<()> {
        let short_name = self.registry.short_name(name);
        let span = info_span!("bot.load_extension", extension = %short_name);
        async move {
            debug!("loading extension {}", short_name);
            let guard = self.begin(Operation::Load, name)?;
            let setup = self
                .registry
                .get(name)
                .and_then(|descriptor| descriptor.setup())
                .ok_or_else(|| {
                    ExtensionError::new(ExtensionErrorKind::NoEntryPoint(name.to_string()))
                })?;

            let components = setup(host).await.map_err(|err| {
                ExtensionError::new(ExtensionErrorKind::Failed {
                    name: name.to_string(),
                    cause: format!("{err:#}"),
                })
            })?;

            debug!(components = components.len(), "extension set up");
            self.active
                .write()
                .insert(guard.name.clone(), LoadedExtension { components });
            Ok::<(), ExtensionError>(())
        }
        .instrument(span)
        .await
    }

    /// Deactivate one extension.
    ///
    /// # Errors
    ///
    /// - `NotLoaded`, `InProgress` from the registry
    /// - `Failed` if the teardown routine returned an error; the extension
    ///   then stays active
    pub async fn unload(&self, host: Arc<C>, name: &str) -> ExtensionResult<()> {
        debug!("unloading extension {}", self.registry.short_name(name));
        let guard = self.begin(Operation::Unload, name)?;

        if let Some(teardown) = self.registry.get(name).and_then(|d| d.teardown()) {
            teardown(host).await.map_err(|err| {
                ExtensionError::new(ExtensionErrorKind::Failed {
                    name: name.to_string(),
                    cause: format!("{err:#}"),
                })
            })?;
        }

        self.active.write().remove(&guard.name);
        Ok(())
    }

    /// Perform one operation behind the per-extension isolation boundary.
    ///
    /// Failures are logged here: an extension's own routine failing is an
    /// error with its cause chain, a registry refusal is a warning. Both
    /// name the acting account when one is given.
    pub async fn attempt(
        &self,
        operation: Operation,
        host: Arc<C>,
        name: &str,
        actor: Option<&Account>,
    ) -> LoadOutcome {
        let result = match operation {
            Operation::Load => self.load(host, name).await,
            Operation::Unload => self.unload(host, name).await,
        };
        let Err(err) = result else {
            return LoadOutcome::Success;
        };

        let prefix = actor.map(|account| format!("{account} ")).unwrap_or_default();
        if err.kind().is_activation_failure() {
            error!(
                extension = name,
                error = %err,
                "{}failed to {} `{}`",
                prefix,
                operation,
                name
            );
        } else {
            warn!("{}failed to {} `{}`: {}", prefix, operation, name, err.reason());
        }
        LoadOutcome::Failure(err)
    }

    /// Activate an extension; `true` if it is now active.
    pub async fn try_load(&self, host: Arc<C>, name: &str, actor: Option<&Account>) -> bool {
        self.attempt(Operation::Load, host, name, actor)
            .await
            .is_success()
    }

    /// Deactivate an extension; `true` if it is no longer active.
    pub async fn try_unload(&self, host: Arc<C>, name: &str, actor: Option<&Account>) -> bool {
        self.attempt(Operation::Unload, host, name, actor)
            .await
            .is_success()
    }

    /// Load every discovered extension concurrently and wait for all of them.
    ///
    /// Loads interleave on the calling task; none is cancelled because
    /// another failed. Returns the size of the active set afterwards.
    ///
    /// # Errors
    ///
    /// Returns `Escaped` if a setup routine panicked, after every other
    /// load has finished.
    pub async fn load_all(&self, host: Arc<C>) -> ExtensionResult<usize> {
        let names = self.registry.discover();
        info!(count = names.len(), "Loading discovered extensions");

        let loads = names.iter().map(|name| {
            let host = Arc::clone(&host);
            async move {
                AssertUnwindSafe(self.try_load(host, name.as_str(), None))
                    .catch_unwind()
                    .await
                    .map_err(|payload| {
                        ExtensionError::new(ExtensionErrorKind::Escaped {
                            name: name.to_string(),
                            detail: panic_detail(payload.as_ref()),
                        })
                    })
            }
        });

        for result in join_all(loads).await {
            result?;
        }

        let loaded = self.len();
        info!("loaded {} extensions", loaded);
        Ok(loaded)
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
