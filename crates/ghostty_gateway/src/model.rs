//! Snapshot types for platform objects.
//!
//! Values are copied out of the gateway's live cache at query time. Holding
//! one never keeps platform state alive or observes later changes.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
            derive_more::Display,
            derive_more::From,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw snowflake value.
            pub fn get(self) -> u64 {
                self.0
            }
        }
    };
}

snowflake!(
    /// Guild (server) id.
    GuildId
);
snowflake!(
    /// Channel id.
    ChannelId
);
snowflake!(
    /// User id.
    UserId
);
snowflake!(
    /// Custom emoji id.
    EmojiId
);
snowflake!(
    /// Role id.
    RoleId
);
snowflake!(
    /// Message id.
    MessageId
);

/// A guild the client is a member of.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Guild {
    id: GuildId,
    name: String,
}

impl Guild {
    /// Create a guild snapshot.
    pub fn new(id: impl Into<GuildId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Platform-level channel type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Guild text channel
    Text,
    /// Forum channel
    Forum,
    /// Voice channel
    Voice,
    /// Announcement channel
    News,
    /// Any thread
    Thread,
    /// Channel category
    Category,
    /// Direct message channel
    Private,
    /// Anything else
    Other,
}

/// A channel visible to the client.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Channel {
    id: ChannelId,
    name: String,
    kind: ChannelKind,
    guild_id: Option<GuildId>,
}

impl Channel {
    /// Create a guild channel snapshot.
    pub fn new(
        id: impl Into<ChannelId>,
        name: impl Into<String>,
        kind: ChannelKind,
        guild_id: Option<GuildId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            guild_id,
        }
    }
}

/// A custom guild emoji.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_more::Display)]
#[display("<{}:{}:{}>", if *animated { "a" } else { "" }, name, id)]
pub struct Emoji {
    id: EmojiId,
    name: String,
    animated: bool,
}

impl Emoji {
    /// Create an emoji snapshot.
    pub fn new(id: impl Into<EmojiId>, name: impl Into<String>, animated: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            animated,
        }
    }
}

/// A user account as seen in events.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_more::Display)]
#[display("{} ({})", name, id)]
pub struct Account {
    id: UserId,
    name: String,
    bot: bool,
}

impl Account {
    /// Create an account snapshot.
    pub fn new(id: impl Into<UserId>, name: impl Into<String>, bot: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bot,
        }
    }
}

/// Guild membership record of a user.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Member {
    user_id: UserId,
    guild_id: GuildId,
    roles: Vec<RoleId>,
}

impl Member {
    /// Create a member snapshot.
    pub fn new(user_id: impl Into<UserId>, guild_id: impl Into<GuildId>, roles: Vec<RoleId>) -> Self {
        Self {
            user_id: user_id.into(),
            guild_id: guild_id.into(),
            roles,
        }
    }

    /// Whether the member carries the given role.
    pub fn has_role(&self, role: RoleId) -> bool {
        self.roles.contains(&role)
    }
}

/// Platform-level message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum MessageKind {
    /// Plain message
    Default,
    /// Inline reply
    Reply,
    /// Slash command invocation
    ChatInputCommand,
    /// Context menu command invocation
    ContextMenuCommand,
    /// System messages (joins, pins, boosts, ...)
    Other,
}

impl MessageKind {
    /// Whether this is a message a human typed, as opposed to a system notice.
    pub fn is_regular(self) -> bool {
        matches!(
            self,
            Self::Default | Self::Reply | Self::ChatInputCommand | Self::ContextMenuCommand
        )
    }
}

/// An inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Message {
    id: MessageId,
    channel_id: ChannelId,
    guild_id: Option<GuildId>,
    author: Account,
    kind: MessageKind,
    content: String,
}

impl Message {
    /// Create a message snapshot.
    pub fn new(
        id: impl Into<MessageId>,
        channel_id: impl Into<ChannelId>,
        guild_id: Option<GuildId>,
        author: Account,
        kind: MessageKind,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            channel_id: channel_id.into(),
            guild_id,
            author,
            kind,
            content: content.into(),
        }
    }

    /// Whether the message was sent outside any guild.
    pub fn is_direct(&self) -> bool {
        self.guild_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emoji_display() {
        assert_eq!(Emoji::new(42, "commit", false).to_string(), "<:commit:42>");
        assert_eq!(Emoji::new(7, "spin", true).to_string(), "<a:spin:7>");
    }

    #[test]
    fn test_account_display() {
        let account = Account::new(1234, "mitchellh", false);
        assert_eq!(account.to_string(), "mitchellh (1234)");
    }

    #[test]
    fn test_regular_message_kinds() {
        assert!(MessageKind::Default.is_regular());
        assert!(MessageKind::Reply.is_regular());
        assert!(MessageKind::ChatInputCommand.is_regular());
        assert!(MessageKind::ContextMenuCommand.is_regular());
        assert!(!MessageKind::Other.is_regular());
    }

    #[test]
    fn test_channel_kind_parses_snake_case() {
        assert_eq!("forum".parse::<ChannelKind>().ok(), Some(ChannelKind::Forum));
        assert_eq!(ChannelKind::Text.to_string(), "text");
    }
}
