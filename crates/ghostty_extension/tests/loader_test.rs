//! Tests for extension loading, unloading and bootstrap fan-out.

use anyhow::Context;
use async_trait::async_trait;
use ghostty_error::ExtensionErrorKind;
use ghostty_extension::{
    Component, ExtensionDescriptor, ExtensionLoader, ExtensionRegistry, Operation, SetupFuture,
    TeardownFuture,
};
use ghostty_gateway::Account;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

const NONE: usize = usize::MAX;
const EXTENSIONS: usize = 4;

/// Host context handed to every setup routine.
struct Host {
    failing: AtomicUsize,
    panicking: AtomicUsize,
    teardown_fails: AtomicBool,
    gate: Notify,
}

impl Host {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            failing: AtomicUsize::new(NONE),
            panicking: AtomicUsize::new(NONE),
            teardown_fails: AtomicBool::new(false),
            gate: Notify::new(),
        })
    }

    fn failing(self: Arc<Self>, index: usize) -> Arc<Self> {
        self.failing.store(index, Ordering::SeqCst);
        self
    }
}

struct Named(String);

#[async_trait]
impl Component for Named {
    fn name(&self) -> &str {
        &self.0
    }
}

fn numbered<const N: usize>(host: Arc<Host>) -> SetupFuture {
    Box::pin(async move {
        tokio::task::yield_now().await;
        if host.panicking.load(Ordering::SeqCst) == N {
            panic!("extension {N} exploded");
        }
        if host.failing.load(Ordering::SeqCst) == N {
            return Err(anyhow::anyhow!("token rejected")).context(format!("extension {N} refused to start"));
        }
        Ok(vec![Arc::new(Named(format!("Component{N}"))) as Arc<dyn Component>])
    })
}

fn teardown(host: Arc<Host>) -> TeardownFuture {
    Box::pin(async move {
        if host.teardown_fails.load(Ordering::SeqCst) {
            anyhow::bail!("teardown refused");
        }
        Ok(())
    })
}

fn gated(host: Arc<Host>) -> SetupFuture {
    Box::pin(async move {
        host.gate.notified().await;
        Ok(Vec::new())
    })
}

fn name(index: usize) -> String {
    format!("components::ext{index}")
}

fn loader() -> ExtensionLoader<Host> {
    let mut registry = ExtensionRegistry::new("components::");
    registry
        .register(
            ExtensionDescriptor::new(name(0).as_str())
                .with_setup(numbered::<0>)
                .with_teardown(teardown),
        )
        .register(ExtensionDescriptor::new(name(1).as_str()).with_setup(numbered::<1>))
        .register(ExtensionDescriptor::new(name(2).as_str()).with_setup(numbered::<2>))
        .register(ExtensionDescriptor::new(name(3).as_str()).with_setup(numbered::<3>))
        .register(ExtensionDescriptor::new("components::gated").with_setup(gated))
        .register(ExtensionDescriptor::new("components::malformed"))
        .register(ExtensionDescriptor::new("vendored::ext").with_setup(numbered::<0>));
    ExtensionLoader::new(registry)
}

/// Loader without the gated extension, so bootstrap never blocks.
fn bootstrap_loader() -> ExtensionLoader<Host> {
    let mut registry = ExtensionRegistry::new("components::");
    registry.register(ExtensionDescriptor::new(name(0).as_str()).with_setup(numbered::<0>));
    registry.register(ExtensionDescriptor::new(name(1).as_str()).with_setup(numbered::<1>));
    registry.register(ExtensionDescriptor::new(name(2).as_str()).with_setup(numbered::<2>));
    registry.register(ExtensionDescriptor::new(name(3).as_str()).with_setup(numbered::<3>));
    registry.register(ExtensionDescriptor::new("components::malformed"));
    ExtensionLoader::new(registry)
}

#[test]
fn test_discovery_excludes_malformed_extensions() {
    let loader = loader();
    let discovered = loader.registry().discover();

    assert!(discovered.contains("components::ext0"));
    assert!(discovered.contains("components::gated"));
    assert!(!discovered.contains("components::malformed"));
    assert!(!discovered.contains("vendored::ext"));
    assert_eq!(discovered.len(), EXTENSIONS + 1);
}

#[tokio::test]
async fn test_load_and_unload() {
    let loader = loader();
    let host = Host::new();

    assert!(loader.try_load(host.clone(), "components::ext1", None).await);
    assert!(loader.is_active("components::ext1"));
    assert!(loader.component("Component1").is_some());

    assert!(loader.try_unload(host.clone(), "components::ext1", None).await);
    assert!(!loader.is_active("components::ext1"));
    assert!(loader.component("Component1").is_none());
}

#[tokio::test]
async fn test_double_load_is_idempotent_failure() {
    let loader = loader();
    let host = Host::new();

    assert!(loader.try_load(host.clone(), "components::ext2", None).await);
    let before = loader.active();

    let outcome = loader
        .attempt(Operation::Load, host.clone(), "components::ext2", None)
        .await;
    assert!(!outcome.is_success());
    assert!(matches!(
        outcome.error().map(|e| e.kind()),
        Some(ExtensionErrorKind::AlreadyLoaded(_))
    ));
    assert_eq!(loader.active(), before);
    assert_eq!(loader.components().len(), 1);
}

#[tokio::test]
async fn test_unload_of_inactive_extension_fails() {
    let loader = loader();
    let host = Host::new();

    let outcome = loader
        .attempt(Operation::Unload, host, "components::ext3", None)
        .await;
    assert!(matches!(
        outcome.error().map(|e| e.kind()),
        Some(ExtensionErrorKind::NotLoaded(_))
    ));
    assert!(loader.is_empty());
}

#[tokio::test]
async fn test_setup_failure_is_isolated_and_classified() {
    let loader = loader();
    let host = Host::new().failing(1);
    let actor = Account::new(42, "operator", false);

    let outcome = loader
        .attempt(Operation::Load, host, "components::ext1", Some(&actor))
        .await;

    let Some(ExtensionErrorKind::Failed { name, cause }) = outcome.error().map(|e| e.kind()) else {
        panic!("expected activation failure, got {outcome:?}");
    };
    assert_eq!(name, "components::ext1");
    assert_eq!(cause, "extension 1 refused to start: token rejected");
    assert!(!loader.is_active("components::ext1"));
}

#[tokio::test]
async fn test_module_system_failures_are_not_activation_failures() {
    let loader = loader();
    let host = Host::new();

    for (extension, expected) in [
        ("components::missing", "could not be found"),
        ("components::malformed", "no setup function"),
        ("vendored::ext", "outside the 'components::' namespace"),
    ] {
        let outcome = loader
            .attempt(Operation::Load, host.clone(), extension, None)
            .await;
        let err = outcome.error().expect("load must fail");
        assert!(!err.kind().is_activation_failure());
        assert!(err.reason().contains(expected), "{}", err.reason());
    }
    assert!(loader.is_empty());
}

#[tokio::test]
async fn test_failed_teardown_keeps_extension_active() {
    let loader = loader();
    let host = Host::new();

    assert!(loader.try_load(host.clone(), "components::ext0", None).await);
    host.teardown_fails.store(true, Ordering::SeqCst);

    assert!(!loader.try_unload(host.clone(), "components::ext0", None).await);
    assert!(loader.is_active("components::ext0"));

    host.teardown_fails.store(false, Ordering::SeqCst);
    assert!(loader.try_unload(host, "components::ext0", None).await);
    assert!(!loader.is_active("components::ext0"));
}

#[tokio::test]
async fn test_reload_is_not_atomic() {
    let loader = loader();
    let host = Host::new();

    assert!(loader.try_load(host.clone(), "components::ext2", None).await);
    host.failing.store(2, Ordering::SeqCst);

    assert!(loader.try_unload(host.clone(), "components::ext2", None).await);
    assert!(!loader.try_load(host.clone(), "components::ext2", None).await);
    assert!(!loader.is_active("components::ext2"));
}

#[tokio::test]
async fn test_concurrent_load_of_same_extension_is_rejected() {
    let loader = loader();
    let host = Host::new();

    let first = loader.load(host.clone(), "components::gated");
    let second = async {
        tokio::task::yield_now().await;
        let result = loader.load(host.clone(), "components::gated").await;
        host.gate.notify_one();
        result
    };
    let (first, second) = tokio::join!(first, second);

    assert!(first.is_ok());
    let err = second.expect_err("second load must be rejected");
    assert!(matches!(err.kind(), ExtensionErrorKind::InProgress(_)));
    assert!(loader.is_active("components::gated"));
}

#[tokio::test]
async fn test_bootstrap_loads_everything_but_the_failing_extension() {
    for failing in 0..EXTENSIONS {
        let loader = bootstrap_loader();
        let host = Host::new().failing(failing);

        let loaded = loader.load_all(host).await.expect("no escaped panic");

        assert_eq!(loaded, EXTENSIONS - 1, "failing extension {failing}");
        assert!(!loader.is_active(&name(failing)));
        for other in (0..EXTENSIONS).filter(|&i| i != failing) {
            assert!(loader.is_active(&name(other)), "extension {other} missing");
        }
    }
}

#[tokio::test]
async fn test_bootstrap_with_no_failures_loads_everything() {
    let loader = bootstrap_loader();
    let loaded = loader.load_all(Host::new()).await.expect("bootstrap");
    assert_eq!(loaded, EXTENSIONS);
    assert_eq!(loader.components().len(), EXTENSIONS);
}

#[tokio::test]
async fn test_escaped_panic_fails_bootstrap() {
    let loader = bootstrap_loader();
    let host = Host::new();
    host.panicking.store(2, Ordering::SeqCst);

    let err = loader
        .load_all(host.clone())
        .await
        .expect_err("panic must escape");

    let ExtensionErrorKind::Escaped { name: escaped, detail } = err.kind() else {
        panic!("expected escaped panic, got {err}");
    };
    assert_eq!(escaped, "components::ext2");
    assert!(detail.contains("extension 2 exploded"));

    // Every other load still ran to completion, and the pending marker is gone.
    assert_eq!(loader.len(), EXTENSIONS - 1);
    host.panicking.store(NONE, Ordering::SeqCst);
    assert!(loader.try_load(host, "components::ext2", None).await);
}
