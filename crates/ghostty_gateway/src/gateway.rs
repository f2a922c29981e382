//! The gateway trait the bot core consumes.

use crate::{Channel, ChannelId, Emoji, Guild, GuildId, Member, Message, MessageId, UserId};
use async_trait::async_trait;
use ghostty_error::GatewayResult;

/// Read access to the platform's live cache plus the handful of writes the
/// core performs.
///
/// Reads are synchronous: they consult whatever the gateway currently holds
/// and return `None` when an object is not (yet) known. Writes suspend on
/// network I/O.
///
/// # Example Implementation
///
/// ```rust,ignore
/// #[async_trait]
/// impl Gateway for MyGateway {
///     fn guild(&self, id: GuildId) -> Option<Guild> {
///         self.cache.guild(id).map(convert_guild)
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Look up a guild in the live cache.
    fn guild(&self, id: GuildId) -> Option<Guild>;

    /// Every guild the client is a member of, ordered by ascending id.
    fn guilds(&self) -> Vec<Guild>;

    /// Look up any channel in the live cache.
    fn channel(&self, id: ChannelId) -> Option<Channel>;

    /// Look up a channel that belongs to a specific guild.
    fn guild_channel(&self, guild: GuildId, id: ChannelId) -> Option<Channel>;

    /// The guild's currently known custom emojis.
    fn guild_emojis(&self, guild: GuildId) -> Vec<Emoji>;

    /// The guild membership record of a user.
    fn member(&self, guild: GuildId, user: UserId) -> Option<Member>;

    /// Send a plain message to a channel.
    async fn send_message(&self, channel: ChannelId, content: &str) -> GatewayResult<()>;

    /// Reply to a message without pinging its author.
    ///
    /// Returns the id of the reply, which lands in the message's channel.
    async fn reply(&self, message: &Message, content: &str) -> GatewayResult<MessageId>;

    /// Replace the content of a message the bot sent.
    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: &str,
    ) -> GatewayResult<()>;

    /// Delete a message.
    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> GatewayResult<()>;

    /// Hide the link previews of someone else's message.
    async fn suppress_embeds(&self, message: &Message) -> GatewayResult<()>;

    /// Send a direct message to a user.
    async fn send_dm(&self, user: UserId, content: &str) -> GatewayResult<()>;
}
