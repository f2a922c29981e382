//! Lazily resolved platform resources for the Ghostty bot.
//!
//! Two caches live here:
//!
//! - [`ResourceCache`] resolves the primary guild, the log and help channels
//!   and the webhook feed channels on first access and keeps the result for
//!   the rest of the process lifetime.
//! - [`EmojiCache`] maps the fixed set of [`EmojiName`]s to the primary
//!   guild's custom emojis, substituting a placeholder for any that are
//!   missing.
//!
//! Both may only be queried after the gateway has signalled readiness; the
//! resource cache enforces that with a [`ReadySignal`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod emoji;
mod memo;
mod resources;

pub use config::{ResourceConfig, WebhookFeedType};
pub use emoji::{EmojiCache, EmojiEntry, EmojiName, EmojiView, PLACEHOLDER};
pub use memo::{Memo, ReadySignal};
pub use resources::ResourceCache;
