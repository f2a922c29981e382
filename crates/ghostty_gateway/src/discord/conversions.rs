//! Conversions from serenity models to gateway snapshots.

use crate::{
    Account, Channel, ChannelKind, Emoji, Guild, GuildId, Member, Message, MessageKind, RoleId,
};
use serenity::all::{
    ChannelType, Emoji as SerenityEmoji, Guild as SerenityGuild, GuildChannel,
    Member as SerenityMember, Message as SerenityMessage, MessageType, User,
};

/// Map serenity's channel type onto [`ChannelKind`].
pub fn channel_kind(kind: ChannelType) -> ChannelKind {
    match kind {
        ChannelType::Text => ChannelKind::Text,
        ChannelType::Forum => ChannelKind::Forum,
        ChannelType::Voice | ChannelType::Stage => ChannelKind::Voice,
        ChannelType::News => ChannelKind::News,
        ChannelType::NewsThread | ChannelType::PublicThread | ChannelType::PrivateThread => {
            ChannelKind::Thread
        }
        ChannelType::Category => ChannelKind::Category,
        ChannelType::Private => ChannelKind::Private,
        _ => ChannelKind::Other,
    }
}

/// Map serenity's message type onto [`MessageKind`].
pub fn message_kind(kind: MessageType) -> MessageKind {
    match kind {
        MessageType::Regular => MessageKind::Default,
        MessageType::InlineReply => MessageKind::Reply,
        MessageType::ChatInputCommand => MessageKind::ChatInputCommand,
        MessageType::ContextMenuCommand => MessageKind::ContextMenuCommand,
        _ => MessageKind::Other,
    }
}

/// Snapshot a cached guild.
pub fn guild(guild: &SerenityGuild) -> Guild {
    Guild::new(guild.id.get(), guild.name.clone())
}

/// Snapshot a guild channel.
pub fn channel(channel: &GuildChannel) -> Channel {
    Channel::new(
        channel.id.get(),
        channel.name.clone(),
        channel_kind(channel.kind),
        Some(GuildId(channel.guild_id.get())),
    )
}

/// Snapshot a custom emoji.
pub fn emoji(emoji: &SerenityEmoji) -> Emoji {
    Emoji::new(emoji.id.get(), emoji.name.clone(), emoji.animated)
}

/// Snapshot a user.
pub fn account(user: &User) -> Account {
    Account::new(user.id.get(), user.name.clone(), user.bot)
}

/// Snapshot a guild member.
pub fn member(member: &SerenityMember) -> Member {
    Member::new(
        member.user.id.get(),
        member.guild_id.get(),
        member.roles.iter().map(|role| RoleId(role.get())).collect(),
    )
}

/// Snapshot an inbound message.
pub fn message(message: &SerenityMessage) -> Message {
    Message::new(
        message.id.get(),
        message.channel_id.get(),
        message.guild_id.map(|id| GuildId(id.get())),
        account(&message.author),
        message_kind(message.kind),
        message.content.clone(),
    )
}
