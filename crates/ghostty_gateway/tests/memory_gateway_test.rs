//! Tests for the in-process gateway.

use ghostty_gateway::{
    Account, Channel, ChannelId, ChannelKind, Emoji, Gateway, Guild, GuildId, MemoryGateway,
    Message, MessageId, MessageKind, Recipient, UserId,
};

fn gateway() -> MemoryGateway {
    let gateway = MemoryGateway::new();
    gateway
        .add_guild(Guild::new(20, "Second"))
        .add_guild(Guild::new(10, "First"))
        .add_channel(Channel::new(100, "log", ChannelKind::Text, Some(GuildId(10))))
        .add_channel(Channel::new(200, "elsewhere", ChannelKind::Text, Some(GuildId(20))));
    gateway
}

#[test]
fn test_guilds_are_ordered_by_id() {
    let gateway = gateway();
    let names: Vec<_> = gateway
        .guilds()
        .into_iter()
        .map(|guild| guild.name().clone())
        .collect();
    assert_eq!(names, vec!["First", "Second"]);
}

#[test]
fn test_guild_channel_requires_membership() {
    let gateway = gateway();
    assert!(gateway.guild_channel(GuildId(10), ChannelId(100)).is_some());
    assert!(gateway.guild_channel(GuildId(10), ChannelId(200)).is_none());
    assert!(gateway.channel(ChannelId(200)).is_some());
}

#[test]
fn test_guild_emojis_default_to_empty() {
    let gateway = gateway();
    assert!(gateway.guild_emojis(GuildId(10)).is_empty());

    gateway.add_emoji(GuildId(10), Emoji::new(1, "commit", false));
    assert_eq!(gateway.guild_emojis(GuildId(10)).len(), 1);
}

#[tokio::test]
async fn test_sends_are_recorded() {
    let gateway = gateway();
    gateway
        .send_message(ChannelId(100), "hello")
        .await
        .expect("known channel");
    gateway.send_dm(UserId(5), "pong").await.expect("dm");

    let message = Message::new(
        9,
        100,
        Some(GuildId(10)),
        Account::new(5, "user", false),
        MessageKind::Default,
        "hi",
    );
    gateway.reply(&message, "reply").await.expect("reply");

    let outbox = gateway.outbox();
    assert_eq!(outbox.len(), 3);
    assert_eq!(outbox[0].recipient, Recipient::Channel(ChannelId(100)));
    assert_eq!(outbox[1].recipient, Recipient::Direct(UserId(5)));
    assert_eq!(outbox[1].content, "pong");
    assert!(matches!(outbox[2].recipient, Recipient::Reply(ChannelId(100), _)));
}

#[tokio::test]
async fn test_replies_can_be_edited_and_deleted() {
    let gateway = gateway();
    let message = Message::new(
        9,
        100,
        Some(GuildId(10)),
        Account::new(5, "user", false),
        MessageKind::Default,
        "https://x.com/a/status/1",
    );

    let first = gateway.reply(&message, "first").await.expect("reply");
    let second = gateway.reply(&message, "second").await.expect("reply");
    assert_ne!(first, second);

    gateway
        .edit_message(ChannelId(100), first, "edited")
        .await
        .expect("sent message");
    gateway
        .delete_message(ChannelId(100), second)
        .await
        .expect("delete");
    gateway.suppress_embeds(&message).await.expect("suppress");

    let outbox = gateway.outbox();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].id, first);
    assert_eq!(outbox[0].content, "edited");
    assert_eq!(gateway.deleted(), vec![second]);
    assert_eq!(gateway.suppressed(), vec![MessageId(9)]);

    assert!(
        gateway
            .edit_message(ChannelId(100), second, "gone")
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_send_to_unknown_channel_fails() {
    let gateway = gateway();
    let result = gateway.send_message(ChannelId(999), "lost").await;
    assert!(result.is_err());
    assert!(gateway.outbox().is_empty());
}

#[test]
fn test_ids_deserialize_transparently() {
    let id: ChannelId = serde_json::from_str("1234").expect("numeric id");
    assert_eq!(id, ChannelId(1234));
}
