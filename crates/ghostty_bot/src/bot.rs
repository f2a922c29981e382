//! The bot context and the gateway entry points it implements.

use crate::telemetry::report_error;
use crate::{BotConfig, BotStatus};
use chrono::Utc;
use ghostty_cache::{EmojiCache, EmojiView, ResourceCache};
use ghostty_error::{GhosttyError, GhosttyResult};
use ghostty_extension::{ExtensionLoader, ExtensionRegistry, LoadOutcome, Operation};
use ghostty_gateway::{Account, BotEvent, ChannelId, Gateway, Message, MessageId};
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span, instrument, warn};

/// Name of the component the message gate consults.
pub const MESSAGE_FILTER: &str = "MessageFilter";

/// What the message gate did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum GateOutcome {
    /// Bot author or non-regular message type
    Ignored,
    /// Direct "ping" answered with "pong"
    Pong,
    /// The message filter suppressed the message
    Filtered,
    /// The message was dispatched to components
    Dispatched,
}

/// Top-level bot context.
///
/// Shared as `Arc<Bot>`: extensions receive it in their setup routines and
/// the gateway handler holds it for the lifetime of the connection.
pub struct Bot {
    config: BotConfig,
    gateway: Arc<dyn Gateway>,
    extensions: ExtensionLoader<Bot>,
    resources: ResourceCache,
    emojis: EmojiCache,
    status: BotStatus,
}

impl Bot {
    /// Create a bot over a gateway and the extensions it may load.
    pub fn new(
        config: BotConfig,
        gateway: Arc<dyn Gateway>,
        registry: ExtensionRegistry<Bot>,
    ) -> Arc<Self> {
        let resources = ResourceCache::new(Arc::clone(&gateway), config.resources());
        Arc::new(Self {
            config,
            gateway,
            extensions: ExtensionLoader::new(registry),
            resources,
            emojis: EmojiCache::new(),
            status: BotStatus::new(),
        })
    }

    /// Startup configuration.
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// The platform gateway.
    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    /// The extension loader and its active set.
    pub fn extensions(&self) -> &ExtensionLoader<Bot> {
        &self.extensions
    }

    /// Lazily resolved guild and channels.
    pub fn resources(&self) -> &ResourceCache {
        &self.resources
    }

    /// Read-only view of the emoji mapping.
    pub fn emojis(&self) -> EmojiView {
        self.emojis.view()
    }

    /// Build metadata and login bookkeeping.
    pub fn status(&self) -> &BotStatus {
        &self.status
    }

    /// Run one extension operation behind the isolation boundary.
    pub async fn attempt_extension(
        self: &Arc<Self>,
        operation: Operation,
        name: &str,
        actor: Option<&Account>,
    ) -> LoadOutcome {
        self.extensions
            .attempt(operation, Arc::clone(self), name, actor)
            .await
    }

    /// Load an extension; `true` if it is now active.
    pub async fn try_load_extension(self: &Arc<Self>, name: &str, actor: Option<&Account>) -> bool {
        self.extensions.try_load(Arc::clone(self), name, actor).await
    }

    /// Unload an extension; `true` if it is no longer active.
    pub async fn try_unload_extension(
        self: &Arc<Self>,
        name: &str,
        actor: Option<&Account>,
    ) -> bool {
        self.extensions
            .try_unload(Arc::clone(self), name, actor)
            .await
    }

    /// Bootstrap: initialize status, then load every discovered extension.
    ///
    /// Status initialization completes before any extension loads. Loads
    /// run concurrently and a failing extension does not affect the others.
    ///
    /// Returns the number of active extensions.
    ///
    /// # Errors
    ///
    /// `Escaped` when an extension panicked during setup.
    pub async fn setup_hook(self: &Arc<Self>) -> GhosttyResult<usize> {
        let span = info_span!("bot.setup", name = "Initial load");
        async {
            self.status.initialize().await;
            let loaded = self.extensions.load_all(Arc::clone(self)).await?;
            Ok::<_, GhosttyError>(loaded)
        }
        .instrument(span)
        .await
    }

    /// Gateway ready: resources become resolvable and emojis are loaded.
    ///
    /// Call this once the gateway's guild cache has been populated, not on
    /// the initial connection: guilds stream in after the connection is up,
    /// and resolving the primary guild before then fails or settles on the
    /// wrong guild. A failed call memoizes nothing, so calling it again once
    /// the guilds are known recovers.
    ///
    /// # Errors
    ///
    /// Any resource resolution defect hit while loading emojis.
    #[instrument(skip_all, fields(user = %identity))]
    pub async fn on_ready(&self, identity: &Account) -> GhosttyResult<()> {
        self.resources.mark_ready();
        self.status.set_last_login_time(Utc::now());
        self.emojis.load(&self.resources).await?;
        info!("logged in as {}", identity);
        Ok(())
    }

    /// Whether an account is a moderator of the primary guild.
    pub fn is_mod(&self, account: &Account) -> bool {
        let Some(role) = self.config.mod_role_id() else {
            return false;
        };
        let guild = match self.resources.guild() {
            Ok(guild) => guild,
            Err(err) => {
                warn!(error = %err, "Cannot check moderator status");
                return false;
            }
        };
        self.gateway
            .member(*guild.id(), *account.id())
            .is_some_and(|member| member.has_role(*role))
    }

    /// The message gate.
    ///
    /// Drops bot-authored and non-regular messages, answers a direct "ping"
    /// with "pong", and otherwise asks the active message filter. Messages
    /// the filter lets through are dispatched as `MessageFilterPassed`.
    #[instrument(skip_all, fields(message = %message.id()))]
    pub async fn on_message(&self, message: &Message) -> GateOutcome {
        if *message.author().bot() || !message.kind().is_regular() {
            return GateOutcome::Ignored;
        }

        if message.is_direct() && message.content() == "ping" {
            debug!("ping sent by {}", message.author());
            self.try_dm(message.author(), "pong").await;
            return GateOutcome::Pong;
        }

        if self.fails_message_filters(message) {
            return GateOutcome::Filtered;
        }

        self.dispatch(BotEvent::MessageFilterPassed(message.clone()))
            .await;
        GateOutcome::Dispatched
    }

    /// Forward an edit of a human-authored message to components.
    #[instrument(skip_all, fields(message = %after.id()))]
    pub async fn on_message_edit(&self, before: Option<&Message>, after: &Message) -> GateOutcome {
        if *after.author().bot() || !after.kind().is_regular() {
            return GateOutcome::Ignored;
        }
        self.dispatch(BotEvent::MessageEdited {
            before: before.cloned(),
            after: after.clone(),
        })
        .await;
        GateOutcome::Dispatched
    }

    /// Forward a deleted message to components.
    #[instrument(skip(self))]
    pub async fn on_message_delete(&self, channel_id: ChannelId, message_id: MessageId) {
        self.dispatch(BotEvent::MessageDeleted {
            channel_id,
            message_id,
        })
        .await;
    }

    fn fails_message_filters(&self, message: &Message) -> bool {
        self.extensions
            .component(MESSAGE_FILTER)
            .is_some_and(|component| {
                component
                    .message_filter()
                    .is_some_and(|filter| filter.check(message))
            })
    }

    async fn try_dm(&self, account: &Account, content: &str) {
        if let Err(err) = self.gateway.send_dm(*account.id(), content).await {
            warn!(error = %err, "Failed to DM {}", account);
        }
    }

    /// Deliver an event to every active component.
    ///
    /// Components are snapshotted first, so loads and unloads during
    /// delivery do not affect this event. A failing handler is reported and
    /// the rest still receive the event.
    pub async fn dispatch(&self, event: BotEvent) {
        for component in self.extensions.components() {
            if let Err(err) = component.handle_event(&event).await {
                self.on_error(component.name(), &err);
            }
        }
    }

    /// Top-level boundary for errors escaping an event handler.
    pub fn on_error(&self, event_method: &str, err: &anyhow::Error) {
        report_error(event_method, err);
    }

    /// Boundary for errors escaping a command.
    pub fn on_command_error(&self, command: &str, err: &anyhow::Error) {
        report_error(&format!("command `{}`", command), err);
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("config", &self.config)
            .field("extensions", &self.extensions.active())
            .field("resources", &self.resources)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
