//! Extension lifecycle management for the Ghostty bot.
//!
//! Feature modules ("extensions") are first-party code compiled into the
//! binary. Each one is described by an [`ExtensionDescriptor`]: a name under
//! the component namespace plus a setup function pointer and an optional
//! teardown function pointer. Setup returns the [`Component`]s the extension
//! contributes; those components receive bot events for as long as the
//! extension stays in the active set.
//!
//! # Architecture
//!
//! - [`ExtensionRegistry`] - the compile-time registry; discovery filters it
//!   to valid extensions
//! - [`ExtensionLoader`] - activates and deactivates single extensions,
//!   isolating and classifying failures, and fans out bootstrap loading
//! - [`Component`] / [`MessageFilter`] - what an active extension exposes
//!
//! # Example
//!
//! ```rust,ignore
//! let mut registry = ExtensionRegistry::new("ghostty_bot::components::");
//! registry.register(ExtensionDescriptor::new("ghostty_bot::components::ping").with_setup(setup));
//!
//! let loader = ExtensionLoader::new(registry);
//! let active = loader.load_all(host.clone()).await?;
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod component;
mod loader;
mod name;
mod registry;

pub use component::{Component, MessageFilter};
pub use loader::{ExtensionLoader, LoadOutcome, Operation};
pub use name::ExtensionName;
pub use registry::{
    ExtensionDescriptor, ExtensionRegistry, SetupFn, SetupFuture, TeardownFn, TeardownFuture,
};
