//! Platform gateway boundary for the Ghostty bot.
//!
//! The bot core never owns platform state. It reads snapshots of guilds,
//! channels, emojis and members through the [`Gateway`] trait and sends
//! messages through the same trait. Two implementations ship with the crate:
//!
//! - [`MemoryGateway`] - in-process state, used by tests and offline checks
//! - `SerenityGateway` - backed by serenity's cache and HTTP client
//!   (requires the `discord` feature)

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod event;
mod gateway;
mod memory;
mod model;

#[cfg(feature = "discord")]
mod discord;

pub use event::BotEvent;
pub use gateway::Gateway;
pub use memory::{MemoryGateway, OutgoingMessage, Recipient};
pub use model::{
    Account, Channel, ChannelId, ChannelKind, Emoji, EmojiId, Guild, GuildId, Member, Message,
    MessageId, MessageKind, RoleId, UserId,
};

#[cfg(feature = "discord")]
pub use discord::{SerenityGateway, conversions};
