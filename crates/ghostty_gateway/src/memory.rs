//! In-process gateway implementation.

use crate::{
    Channel, ChannelId, Emoji, Gateway, Guild, GuildId, Member, Message, MessageId, UserId,
};
use async_trait::async_trait;
use ghostty_error::{GatewayError, GatewayErrorKind, GatewayResult};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// Where an outgoing message was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// A channel
    Channel(ChannelId),
    /// A reply to a message in a channel
    Reply(ChannelId, MessageId),
    /// A user's direct messages
    Direct(UserId),
}

/// First id handed out to messages the gateway sends.
const FIRST_SENT_ID: u64 = 10_000;

/// A message recorded by [`MemoryGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Id assigned on send
    pub id: MessageId,
    /// Destination
    pub recipient: Recipient,
    /// Message text
    pub content: String,
}

#[derive(Debug, Default)]
struct State {
    guilds: BTreeMap<GuildId, Guild>,
    channels: HashMap<ChannelId, Channel>,
    emojis: HashMap<GuildId, Vec<Emoji>>,
    members: HashMap<(GuildId, UserId), Member>,
    outbox: Vec<OutgoingMessage>,
    deleted: Vec<MessageId>,
    suppressed: Vec<MessageId>,
    sent: u64,
    lookups: usize,
}

/// Gateway backed by in-process maps.
///
/// Every send is recorded in an outbox instead of leaving the process, and
/// every read bumps a lookup counter so callers can verify memoization.
/// Edits rewrite the matching outbox entry and deletes remove it.
///
/// # Example
///
/// ```
/// use ghostty_gateway::{Gateway, Guild, MemoryGateway};
///
/// let gateway = MemoryGateway::new();
/// gateway.add_guild(Guild::new(1, "Ghostty"));
/// assert_eq!(gateway.guilds().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: RwLock<State>,
}

impl MemoryGateway {
    /// Create an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a guild.
    pub fn add_guild(&self, guild: Guild) -> &Self {
        self.state.write().guilds.insert(*guild.id(), guild);
        self
    }

    /// Add or replace a channel.
    pub fn add_channel(&self, channel: Channel) -> &Self {
        self.state.write().channels.insert(*channel.id(), channel);
        self
    }

    /// Remove a channel.
    pub fn remove_channel(&self, id: ChannelId) -> &Self {
        self.state.write().channels.remove(&id);
        self
    }

    /// Add a custom emoji to a guild.
    pub fn add_emoji(&self, guild: GuildId, emoji: Emoji) -> &Self {
        self.state.write().emojis.entry(guild).or_default().push(emoji);
        self
    }

    /// Add or replace a member record.
    pub fn add_member(&self, member: Member) -> &Self {
        self.state
            .write()
            .members
            .insert((*member.guild_id(), *member.user_id()), member);
        self
    }

    /// Everything sent so far, oldest first.
    pub fn outbox(&self) -> Vec<OutgoingMessage> {
        self.state.read().outbox.clone()
    }

    /// Ids of every deleted message, oldest first.
    pub fn deleted(&self) -> Vec<MessageId> {
        self.state.read().deleted.clone()
    }

    /// Ids of every message whose embeds were suppressed.
    pub fn suppressed(&self) -> Vec<MessageId> {
        self.state.read().suppressed.clone()
    }

    /// Number of cache reads served so far.
    pub fn lookups(&self) -> usize {
        self.state.read().lookups
    }

    fn record(&self, recipient: Recipient, content: &str) -> MessageId {
        tracing::debug!(?recipient, "Recording outgoing message");
        let mut state = self.state.write();
        let id = MessageId(FIRST_SENT_ID + state.sent);
        state.sent += 1;
        state.outbox.push(OutgoingMessage {
            id,
            recipient,
            content: content.to_string(),
        });
        id
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    fn guild(&self, id: GuildId) -> Option<Guild> {
        let mut state = self.state.write();
        state.lookups += 1;
        state.guilds.get(&id).cloned()
    }

    fn guilds(&self) -> Vec<Guild> {
        let mut state = self.state.write();
        state.lookups += 1;
        state.guilds.values().cloned().collect()
    }

    fn channel(&self, id: ChannelId) -> Option<Channel> {
        let mut state = self.state.write();
        state.lookups += 1;
        state.channels.get(&id).cloned()
    }

    fn guild_channel(&self, guild: GuildId, id: ChannelId) -> Option<Channel> {
        self.channel(id)
            .filter(|channel| channel.guild_id().as_ref() == Some(&guild))
    }

    fn guild_emojis(&self, guild: GuildId) -> Vec<Emoji> {
        let mut state = self.state.write();
        state.lookups += 1;
        state.emojis.get(&guild).cloned().unwrap_or_default()
    }

    fn member(&self, guild: GuildId, user: UserId) -> Option<Member> {
        let mut state = self.state.write();
        state.lookups += 1;
        state.members.get(&(guild, user)).cloned()
    }

    async fn send_message(&self, channel: ChannelId, content: &str) -> GatewayResult<()> {
        if !self.state.read().channels.contains_key(&channel) {
            return Err(GatewayError::new(GatewayErrorKind::ChannelNotFound(
                channel.get(),
            )));
        }
        self.record(Recipient::Channel(channel), content);
        Ok(())
    }

    async fn reply(&self, message: &Message, content: &str) -> GatewayResult<MessageId> {
        Ok(self.record(
            Recipient::Reply(*message.channel_id(), *message.id()),
            content,
        ))
    }

    async fn edit_message(
        &self,
        _channel: ChannelId,
        message: MessageId,
        content: &str,
    ) -> GatewayResult<()> {
        let mut state = self.state.write();
        let sent = state
            .outbox
            .iter_mut()
            .find(|sent| sent.id == message)
            .ok_or_else(|| GatewayError::new(GatewayErrorKind::MessageNotFound(message.get())))?;
        sent.content = content.to_string();
        Ok(())
    }

    async fn delete_message(&self, _channel: ChannelId, message: MessageId) -> GatewayResult<()> {
        let mut state = self.state.write();
        state.outbox.retain(|sent| sent.id != message);
        state.deleted.push(message);
        Ok(())
    }

    async fn suppress_embeds(&self, message: &Message) -> GatewayResult<()> {
        self.state.write().suppressed.push(*message.id());
        Ok(())
    }

    async fn send_dm(&self, user: UserId, content: &str) -> GatewayResult<()> {
        self.record(Recipient::Direct(user), content);
        Ok(())
    }
}
