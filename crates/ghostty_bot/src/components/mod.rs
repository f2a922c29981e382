//! Built-in extensions.
//!
//! Each submodule is one extension named by its module path and exposes a
//! `descriptor()` for the registry.

pub mod fixup_embeds;
pub mod message_filter;
pub mod xkcd_mentions;

use crate::Bot;
use ghostty_extension::ExtensionRegistry;

/// Namespace every built-in extension lives under.
pub const NAMESPACE: &str = concat!(module_path!(), "::");

/// Registry of every built-in extension.
pub fn registry() -> ExtensionRegistry<Bot> {
    let mut registry = ExtensionRegistry::new(NAMESPACE);
    registry
        .register(fixup_embeds::descriptor())
        .register(message_filter::descriptor())
        .register(xkcd_mentions::descriptor());
    registry
}
