//! Gateway implementation over serenity's cache and HTTP client.

use super::conversions;
use crate::{
    Channel, ChannelId, Emoji, Gateway, Guild, GuildId, Member, Message, MessageId, UserId,
};
use async_trait::async_trait;
use ghostty_error::{GatewayError, GatewayErrorKind, GatewayResult};
use serenity::all::{
    Cache, ChannelId as SerenityChannelId, CreateAllowedMentions, CreateMessage, EditMessage,
    GuildId as SerenityGuildId, Http, MessageId as SerenityMessageId, UserId as SerenityUserId,
};
use std::sync::{Arc, OnceLock};
use tracing::{debug, instrument};

/// Gateway reading from a serenity client's cache.
///
/// The serenity client is built after the bot context, so the cache and HTTP
/// handles are attached once the client exists. Until then every read
/// returns nothing and every write fails with `NotConnected`.
#[derive(Default)]
pub struct SerenityGateway {
    client: OnceLock<(Arc<Cache>, Arc<Http>)>,
}

impl SerenityGateway {
    /// Create a detached gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the client's cache and HTTP handles. Later calls are ignored.
    pub fn attach(&self, cache: Arc<Cache>, http: Arc<Http>) {
        if self.client.set((cache, http)).is_err() {
            debug!("Serenity gateway already attached");
        }
    }

    fn cache(&self) -> Option<&Cache> {
        self.client.get().map(|(cache, _)| cache.as_ref())
    }

    fn http(&self) -> GatewayResult<&Http> {
        self.client
            .get()
            .map(|(_, http)| http.as_ref())
            .ok_or_else(|| GatewayError::new(GatewayErrorKind::NotConnected))
    }
}

// Serenity ids are non-zero; an unset configuration value of 0 never resolves.
fn guild_id(id: GuildId) -> Option<SerenityGuildId> {
    (id.get() != 0).then(|| SerenityGuildId::new(id.get()))
}

fn channel_id(id: ChannelId) -> GatewayResult<SerenityChannelId> {
    (id.get() != 0)
        .then(|| SerenityChannelId::new(id.get()))
        .ok_or_else(|| GatewayError::new(GatewayErrorKind::ChannelNotFound(id.get())))
}

fn message_id(id: MessageId) -> GatewayResult<SerenityMessageId> {
    (id.get() != 0)
        .then(|| SerenityMessageId::new(id.get()))
        .ok_or_else(|| GatewayError::new(GatewayErrorKind::MessageNotFound(id.get())))
}

#[async_trait]
impl Gateway for SerenityGateway {
    fn guild(&self, id: GuildId) -> Option<Guild> {
        let cache = self.cache()?;
        cache
            .guild(guild_id(id)?)
            .map(|guild| conversions::guild(&guild))
    }

    fn guilds(&self) -> Vec<Guild> {
        let Some(cache) = self.cache() else {
            return Vec::new();
        };
        let mut ids = cache.guilds();
        ids.sort_by_key(|id| id.get());
        ids.into_iter()
            .filter_map(|id| cache.guild(id).map(|guild| conversions::guild(&guild)))
            .collect()
    }

    fn channel(&self, id: ChannelId) -> Option<Channel> {
        let cache = self.cache()?;
        let id = channel_id(id).ok()?;
        cache.channel(id).map(|channel| conversions::channel(&channel))
    }

    fn guild_channel(&self, guild: GuildId, id: ChannelId) -> Option<Channel> {
        let cache = self.cache()?;
        let id = channel_id(id).ok()?;
        let guild = cache.guild(guild_id(guild)?)?;
        guild.channels.get(&id).map(conversions::channel)
    }

    fn guild_emojis(&self, guild: GuildId) -> Vec<Emoji> {
        self.cache()
            .zip(guild_id(guild))
            .and_then(|(cache, id)| {
                cache
                    .guild(id)
                    .map(|guild| guild.emojis.values().map(conversions::emoji).collect())
            })
            .unwrap_or_default()
    }

    fn member(&self, guild: GuildId, user: UserId) -> Option<Member> {
        let cache = self.cache()?;
        let guild = cache.guild(guild_id(guild)?)?;
        if user.get() == 0 {
            return None;
        }
        guild
            .members
            .get(&SerenityUserId::new(user.get()))
            .map(conversions::member)
    }

    #[instrument(skip(self, content), fields(channel = %channel, len = content.len()))]
    async fn send_message(&self, channel: ChannelId, content: &str) -> GatewayResult<()> {
        let http = self.http()?;
        channel_id(channel)?.say(http, content).await?;
        Ok(())
    }

    #[instrument(skip(self, message, content), fields(message = %message.id()))]
    async fn reply(&self, message: &Message, content: &str) -> GatewayResult<MessageId> {
        let http = self.http()?;
        let channel = channel_id(*message.channel_id())?;
        let builder = CreateMessage::new()
            .content(content)
            .reference_message((channel, message_id(*message.id())?))
            .allowed_mentions(CreateAllowedMentions::new());
        let sent = channel.send_message(http, builder).await?;
        Ok(MessageId(sent.id.get()))
    }

    #[instrument(skip(self, content), fields(channel = %channel, message = %message))]
    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: &str,
    ) -> GatewayResult<()> {
        let http = self.http()?;
        channel_id(channel)?
            .edit_message(http, message_id(message)?, EditMessage::new().content(content))
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(channel = %channel, message = %message))]
    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> GatewayResult<()> {
        let http = self.http()?;
        channel_id(channel)?
            .delete_message(http, message_id(message)?)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, message), fields(message = %message.id()))]
    async fn suppress_embeds(&self, message: &Message) -> GatewayResult<()> {
        let http = self.http()?;
        channel_id(*message.channel_id())?
            .edit_message(
                http,
                message_id(*message.id())?,
                EditMessage::new().suppress_embeds(true),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self, content), fields(user = %user))]
    async fn send_dm(&self, user: UserId, content: &str) -> GatewayResult<()> {
        if user.get() == 0 {
            return Err(GatewayError::new(GatewayErrorKind::UserNotFound(0)));
        }
        let http = self.http()?;
        let dm = SerenityUserId::new(user.get()).create_dm_channel(http).await?;
        dm.id.say(http, content).await?;
        Ok(())
    }
}
