//! What an active extension contributes to the bot.

use async_trait::async_trait;
use ghostty_gateway::{BotEvent, Message};

/// Decides whether a message should be suppressed before other components
/// see it.
pub trait MessageFilter: Send + Sync {
    /// Returns `true` when the message should be filtered out.
    fn check(&self, message: &Message) -> bool;
}

/// A unit of behavior registered by an extension's setup routine.
///
/// Components are looked up by [`name`](Component::name) among the active
/// extensions and receive every dispatched [`BotEvent`].
#[async_trait]
pub trait Component: Send + Sync {
    /// Component name used for lookups, e.g. `"MessageFilter"`.
    fn name(&self) -> &str;

    /// Message filter exposed by this component, if any.
    fn message_filter(&self) -> Option<&dyn MessageFilter> {
        None
    }

    /// React to a dispatched event.
    ///
    /// # Errors
    ///
    /// Errors are reported by the dispatcher and never reach other components.
    async fn handle_event(&self, _event: &BotEvent) -> anyhow::Result<()> {
        Ok(())
    }
}
