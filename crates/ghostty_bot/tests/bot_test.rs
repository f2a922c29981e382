//! Tests for bootstrap, the ready handler and the message gate.

use async_trait::async_trait;
use ghostty_bot::{Bot, BotConfig, GateOutcome, MESSAGE_FILTER, components};
use ghostty_extension::{
    Component, ExtensionDescriptor, ExtensionRegistry, MessageFilter, SetupFuture,
};
use ghostty_gateway::{
    Account, BotEvent, Channel, ChannelId, ChannelKind, Gateway, Guild, GuildId, Member,
    MemoryGateway, Message, MessageId, MessageKind, Recipient, RoleId,
};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};

const LOG: ChannelId = ChannelId(10);
const HELP: ChannelId = ChannelId(11);
const GENERAL: ChannelId = ChannelId(12);

/// Filter checks per bot, keyed by token so tests can run in parallel.
static CHECKS: LazyLock<Mutex<HashMap<String, usize>>> = LazyLock::new(Default::default);

fn checks(bot: &Bot) -> usize {
    CHECKS
        .lock()
        .unwrap()
        .get(bot.config().token())
        .copied()
        .unwrap_or(0)
}

struct SpyFilter {
    token: String,
}

impl MessageFilter for SpyFilter {
    fn check(&self, message: &Message) -> bool {
        *CHECKS.lock().unwrap().entry(self.token.clone()).or_default() += 1;
        message.content().contains("blocked")
    }
}

#[async_trait]
impl Component for SpyFilter {
    fn name(&self) -> &str {
        MESSAGE_FILTER
    }

    fn message_filter(&self) -> Option<&dyn MessageFilter> {
        Some(self)
    }
}

struct SpyListener {
    gateway: Arc<dyn Gateway>,
}

#[async_trait]
impl Component for SpyListener {
    fn name(&self) -> &str {
        "SpyListener"
    }

    async fn handle_event(&self, event: &BotEvent) -> anyhow::Result<()> {
        let note = match event {
            BotEvent::MessageFilterPassed(message) => format!("seen: {}", message.content()),
            BotEvent::MessageEdited { before, after } => format!(
                "edited: {} -> {}",
                before.as_ref().map_or("?", |m| m.content().as_str()),
                after.content()
            ),
            BotEvent::MessageDeleted { message_id, .. } => format!("deleted: {}", message_id),
            _ => return Ok(()),
        };
        self.gateway.send_message(LOG, &note).await?;
        Ok(())
    }
}

struct FailingListener;

#[async_trait]
impl Component for FailingListener {
    fn name(&self) -> &str {
        "FailingListener"
    }

    async fn handle_event(&self, _event: &BotEvent) -> anyhow::Result<()> {
        anyhow::bail!("listener is broken")
    }
}

fn spy_filter(bot: Arc<Bot>) -> SetupFuture {
    Box::pin(async move {
        let token = bot.config().token().clone();
        Ok(vec![Arc::new(SpyFilter { token }) as Arc<dyn Component>])
    })
}

fn spy_listener(bot: Arc<Bot>) -> SetupFuture {
    Box::pin(async move {
        let gateway = Arc::clone(bot.gateway());
        Ok(vec![
            Arc::new(FailingListener) as Arc<dyn Component>,
            Arc::new(SpyListener { gateway }),
        ])
    })
}

fn gateway() -> Arc<MemoryGateway> {
    let gateway = MemoryGateway::new();
    gateway
        .add_guild(Guild::new(1, "Ghostty"))
        .add_channel(Channel::new(LOG, "log", ChannelKind::Text, Some(GuildId(1))))
        .add_channel(Channel::new(HELP, "help", ChannelKind::Forum, Some(GuildId(1))))
        .add_channel(Channel::new(GENERAL, "general", ChannelKind::Text, Some(GuildId(1))))
        .add_member(Member::new(42, 1, vec![RoleId(7)]))
        .add_member(Member::new(43, 1, vec![]));
    Arc::new(gateway)
}

fn config(token: &str) -> BotConfig {
    BotConfig::new(token, LOG, HELP)
        .with_guild_id(Some(GuildId(1)))
        .with_mod_role_id(Some(RoleId(7)))
}

fn spy_registry() -> ExtensionRegistry<Bot> {
    let mut registry = ExtensionRegistry::new(components::NAMESPACE);
    registry
        .register(
            ExtensionDescriptor::new("ghostty_bot::components::spy_filter").with_setup(spy_filter),
        )
        .register(
            ExtensionDescriptor::new("ghostty_bot::components::spy_listener")
                .with_setup(spy_listener),
        );
    registry
}

async fn spy_bot(token: &str) -> (Arc<MemoryGateway>, Arc<Bot>) {
    let gateway = gateway();
    let bot = Bot::new(config(token), gateway.clone(), spy_registry());
    assert_eq!(bot.setup_hook().await.unwrap(), 2);
    (gateway, bot)
}

fn user(bot: bool) -> Account {
    Account::new(43, if bot { "robot" } else { "user" }, bot)
}

fn guild_message(author: Account, content: &str) -> Message {
    Message::new(100, GENERAL, Some(GuildId(1)), author, MessageKind::Default, content)
}

fn direct_message(content: &str) -> Message {
    Message::new(101, 500, None, user(false), MessageKind::Default, content)
}

fn notes(gateway: &MemoryGateway, prefix: &str) -> Vec<String> {
    gateway
        .outbox()
        .into_iter()
        .filter(|m| m.content.starts_with(prefix))
        .map(|m| m.content)
        .collect()
}

fn seen(gateway: &MemoryGateway) -> Vec<String> {
    notes(gateway, "seen: ")
}

#[tokio::test]
async fn test_bot_messages_never_reach_the_filter() {
    let (gateway, bot) = spy_bot("bot-authored").await;

    let outcome = bot.on_message(&guild_message(user(true), "hello")).await;

    assert_eq!(outcome, GateOutcome::Ignored);
    assert_eq!(checks(&bot), 0);
    assert!(gateway.outbox().is_empty());
}

#[tokio::test]
async fn test_system_messages_are_ignored() {
    let (gateway, bot) = spy_bot("system").await;
    let message = Message::new(
        100,
        GENERAL,
        Some(GuildId(1)),
        user(false),
        MessageKind::Other,
        "joined",
    );

    assert_eq!(bot.on_message(&message).await, GateOutcome::Ignored);
    assert_eq!(checks(&bot), 0);
    assert!(gateway.outbox().is_empty());
}

#[tokio::test]
async fn test_direct_ping_gets_pong_and_skips_the_filter() {
    let (gateway, bot) = spy_bot("ping").await;

    let outcome = bot.on_message(&direct_message("ping")).await;

    assert_eq!(outcome, GateOutcome::Pong);
    assert_eq!(checks(&bot), 0);
    let outbox = gateway.outbox();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].recipient, Recipient::Direct(*user(false).id()));
    assert_eq!(outbox[0].content, "pong");
}

#[tokio::test]
async fn test_ping_must_be_exact_and_direct() {
    let (gateway, bot) = spy_bot("not-ping").await;

    assert_eq!(
        bot.on_message(&direct_message("ping please")).await,
        GateOutcome::Dispatched
    );
    assert_eq!(
        bot.on_message(&guild_message(user(false), "ping")).await,
        GateOutcome::Dispatched
    );
    assert_eq!(checks(&bot), 2);
    assert!(gateway.outbox().iter().all(|m| m.content != "pong"));
}

#[tokio::test]
async fn test_passing_message_dispatches_exactly_one_event() {
    let (gateway, bot) = spy_bot("dispatch").await;

    let outcome = bot
        .on_message(&guild_message(user(false), "hello ghostty"))
        .await;

    assert_eq!(outcome, GateOutcome::Dispatched);
    assert_eq!(checks(&bot), 1);
    // The failing listener sorts first and does not stop delivery.
    assert_eq!(seen(&gateway), vec!["seen: hello ghostty"]);
}

#[tokio::test]
async fn test_filtered_message_is_not_dispatched() {
    let (gateway, bot) = spy_bot("filtered").await;

    let outcome = bot
        .on_message(&guild_message(user(false), "this is blocked"))
        .await;

    assert_eq!(outcome, GateOutcome::Filtered);
    assert!(seen(&gateway).is_empty());
}

#[tokio::test]
async fn test_inactive_filter_lets_everything_through() {
    let (gateway, bot) = spy_bot("no-filter").await;
    assert!(
        bot.try_unload_extension("ghostty_bot::components::spy_filter", None)
            .await
    );

    let outcome = bot
        .on_message(&guild_message(user(false), "this is blocked"))
        .await;

    assert_eq!(outcome, GateOutcome::Dispatched);
    assert_eq!(checks(&bot), 0);
    assert_eq!(seen(&gateway), vec!["seen: this is blocked"]);
}

#[tokio::test]
async fn test_setup_hook_initializes_status_first() {
    let (_gateway, bot) = spy_bot("setup").await;

    assert!(bot.status().is_initialized());
    assert_eq!(bot.extensions().len(), 2);
}

#[tokio::test]
async fn test_on_ready_loads_emojis_and_records_login() {
    let gateway = gateway();
    gateway.add_emoji(GuildId(1), ghostty_gateway::Emoji::new(5, "commit", false));
    let bot = Bot::new(config("ready"), gateway.clone(), spy_registry());
    assert!(bot.resources().guild().is_err());

    bot.on_ready(&Account::new(1, "Ghostty Bot", true)).await.unwrap();

    assert!(bot.resources().is_ready());
    assert!(bot.status().last_login_time().is_some());
    assert!(bot.emojis().is_loaded());
    assert_eq!(bot.emojis().render(ghostty_cache::EmojiName::Commit), "<:commit:5>");

    let reports: Vec<_> = gateway
        .outbox()
        .into_iter()
        .filter(|m| m.recipient == Recipient::Channel(LOG))
        .collect();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].content.contains("pull_open"));
}

#[tokio::test]
async fn test_guilds_arriving_after_connection_still_load_emojis() {
    let gateway = Arc::new(MemoryGateway::new());
    let bot = Bot::new(config("late-guild"), gateway.clone(), spy_registry());
    let identity = Account::new(1, "Ghostty Bot", true);

    // Connected, but no guild has been delivered yet.
    assert!(bot.on_ready(&identity).await.is_err());
    assert!(!bot.emojis().is_loaded());

    gateway
        .add_guild(Guild::new(1, "Ghostty"))
        .add_channel(Channel::new(LOG, "log", ChannelKind::Text, Some(GuildId(1))))
        .add_emoji(GuildId(1), ghostty_gateway::Emoji::new(5, "commit", false));
    bot.on_ready(&identity).await.unwrap();

    assert_eq!(bot.resources().guild().unwrap().name(), "Ghostty");
    assert!(bot.emojis().is_loaded());
    assert_eq!(bot.emojis().render(ghostty_cache::EmojiName::Commit), "<:commit:5>");
}

#[tokio::test]
async fn test_configured_guild_wins_once_every_guild_is_cached() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.add_guild(Guild::new(0, "Arrived first"));
    let bot = Bot::new(config("guild-order"), gateway.clone(), spy_registry());

    gateway
        .add_guild(Guild::new(1, "Ghostty"))
        .add_channel(Channel::new(LOG, "log", ChannelKind::Text, Some(GuildId(1))));
    bot.on_ready(&Account::new(1, "Ghostty Bot", true))
        .await
        .unwrap();

    assert_eq!(bot.resources().guild().unwrap().id(), &GuildId(1));
}

#[tokio::test]
async fn test_on_ready_surfaces_misconfigured_log_channel() {
    let gateway = gateway();
    let config = BotConfig::new("bad-log", HELP, HELP).with_guild_id(Some(GuildId(1)));
    let bot = Bot::new(config, gateway, spy_registry());

    let err = bot.on_ready(&Account::new(1, "Ghostty Bot", true)).await.unwrap_err();
    assert!(err.to_string().contains("log channel"));
}

#[tokio::test]
async fn test_is_mod() {
    let gateway = gateway();
    let bot = Bot::new(config("mods"), gateway.clone(), spy_registry());
    bot.resources().mark_ready();

    assert!(bot.is_mod(&Account::new(42, "moderator", false)));
    assert!(!bot.is_mod(&Account::new(43, "user", false)));
    assert!(!bot.is_mod(&Account::new(44, "stranger", false)));

    let unconfigured = Bot::new(
        BotConfig::new("no-mod-role", LOG, HELP),
        gateway,
        spy_registry(),
    );
    unconfigured.resources().mark_ready();
    assert!(!unconfigured.is_mod(&Account::new(42, "moderator", false)));
}

#[tokio::test]
async fn test_builtin_components_end_to_end() {
    let gateway = gateway();
    let bot = Bot::new(config("builtin"), gateway.clone(), components::registry());

    assert_eq!(bot.setup_hook().await.unwrap(), 3);

    assert_eq!(
        bot.on_message(&guild_message(user(false), "@everyone look"))
            .await,
        GateOutcome::Filtered
    );
    assert_eq!(
        bot.on_message(&guild_message(
            user(false),
            "look https://x.com/ghostty/status/1"
        ))
        .await,
        GateOutcome::Dispatched
    );

    let outbox = gateway.outbox();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].recipient, Recipient::Reply(GENERAL, MessageId(100)));
    assert_eq!(outbox[0].content, "https://fixupx.com/ghostty/status/1");
    assert_eq!(gateway.suppressed(), vec![MessageId(100)]);

    bot.on_message_delete(GENERAL, MessageId(100)).await;
    assert!(gateway.outbox().is_empty());
}

#[tokio::test]
async fn test_edits_and_deletes_reach_components() {
    let (gateway, bot) = spy_bot("edits").await;
    let before = guild_message(user(false), "first draft");
    let after = guild_message(user(false), "second draft");

    assert_eq!(
        bot.on_message_edit(Some(&before), &after).await,
        GateOutcome::Dispatched
    );
    assert_eq!(
        bot.on_message_edit(None, &guild_message(user(true), "bot edit"))
            .await,
        GateOutcome::Ignored
    );
    bot.on_message_delete(GENERAL, MessageId(100)).await;

    assert_eq!(
        notes(&gateway, "edited: "),
        vec!["edited: first draft -> second draft"]
    );
    assert_eq!(notes(&gateway, "deleted: "), vec!["deleted: 100"]);
}
