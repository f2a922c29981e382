//! Events the core emits for components to react to.

use crate::{ChannelId, Message, MessageId};

/// Derived event dispatched to every active component.
#[derive(Debug, Clone, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum BotEvent {
    /// A regular message passed every message filter.
    MessageFilterPassed(Message),

    /// A human-authored message was edited.
    MessageEdited {
        /// The message before the edit, when the gateway still had it
        before: Option<Message>,
        /// The message after the edit
        after: Message,
    },

    /// A message was deleted.
    MessageDeleted {
        /// Channel the message lived in
        channel_id: ChannelId,
        /// The deleted message
        message_id: MessageId,
    },
}
