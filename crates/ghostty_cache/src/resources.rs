//! Memoized accessors for the platform objects the bot depends on.

use crate::{Memo, ReadySignal, ResourceConfig, WebhookFeedType};
use ghostty_error::{ResourceError, ResourceErrorKind, ResourceResult};
use ghostty_gateway::{Channel, ChannelId, ChannelKind, Gateway, Guild};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Lazily resolved guild and channels.
///
/// Each accessor queries the gateway on first successful access and returns
/// the same `Arc` on every later call, even if the platform state has since
/// changed. Nothing is ever invalidated; a restart is the only way to pick up
/// a renamed or recreated channel.
///
/// Every accessor fails with `NotReady` until [`mark_ready`](Self::mark_ready)
/// has been called from the gateway's ready handler.
pub struct ResourceCache {
    gateway: Arc<dyn Gateway>,
    config: ResourceConfig,
    ready: ReadySignal,
    guild: Memo<Guild>,
    log_channel: Memo<Channel>,
    help_channel: Memo<Channel>,
    webhook_channels: Memo<BTreeMap<WebhookFeedType, Channel>>,
}

impl ResourceCache {
    /// Create a cache with nothing resolved.
    pub fn new(gateway: Arc<dyn Gateway>, config: ResourceConfig) -> Self {
        Self {
            gateway,
            config,
            ready: ReadySignal::new(),
            guild: Memo::new(),
            log_channel: Memo::new(),
            help_channel: Memo::new(),
            webhook_channels: Memo::new(),
        }
    }

    /// The gateway resources are resolved against.
    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    /// The configured ids.
    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Allow resolution from now on.
    pub fn mark_ready(&self) {
        self.ready.mark_ready();
    }

    /// Whether the gateway has signalled readiness.
    pub fn is_ready(&self) -> bool {
        self.ready.is_ready()
    }

    /// The guild the bot serves.
    ///
    /// The configured guild when the gateway knows it, otherwise the first
    /// guild the client is a member of.
    ///
    /// # Errors
    ///
    /// `NotReady` before readiness, `NoGuilds` when the client has no guild
    /// at all.
    pub fn guild(&self) -> ResourceResult<Arc<Guild>> {
        self.ready.ensure("primary guild")?;
        self.guild.get_or_try_init(|| {
            if let Some(id) = self.config.guild_id()
                && let Some(guild) = self.gateway.guild(*id)
            {
                debug!(guild = %guild.name(), "Resolved configured guild");
                return Ok(guild);
            }
            let guild = self
                .gateway
                .guilds()
                .into_iter()
                .next()
                .ok_or_else(|| ResourceError::new(ResourceErrorKind::NoGuilds))?;
            info!(
                "guild {:?} not found; falling back to first guild: {} ({})",
                self.config.guild_id().map(|id| id.get()),
                guild.name(),
                guild.id()
            );
            Ok(guild)
        })
    }

    /// The text channel the bot reports to.
    ///
    /// # Errors
    ///
    /// `ChannelNotFound` or `ChannelKindMismatch` when the configured id does
    /// not name a text channel.
    pub fn log_channel(&self) -> ResourceResult<Arc<Channel>> {
        self.ready.ensure("log channel")?;
        self.log_channel.get_or_try_init(|| {
            self.resolve_channel("log channel", *self.config.log_channel_id(), ChannelKind::Text)
        })
    }

    /// The forum channel help threads live in.
    ///
    /// # Errors
    ///
    /// `ChannelNotFound` or `ChannelKindMismatch` when the configured id does
    /// not name a forum channel.
    pub fn help_channel(&self) -> ResourceResult<Arc<Channel>> {
        self.ready.ensure("help channel")?;
        self.help_channel.get_or_try_init(|| {
            self.resolve_channel("help channel", *self.config.help_channel_id(), ChannelKind::Forum)
        })
    }

    /// Channel per webhook feed, resolved inside the primary guild.
    ///
    /// Either every configured feed resolves to a text channel or the whole
    /// mapping fails.
    ///
    /// # Errors
    ///
    /// `WebhookChannelMissing` or `WebhookChannelNotText` naming the first
    /// offending feed, or any error from [`guild`](Self::guild).
    #[instrument(skip(self))]
    pub fn webhook_channels(&self) -> ResourceResult<Arc<BTreeMap<WebhookFeedType, Channel>>> {
        self.ready.ensure("webhook channels")?;
        self.webhook_channels.get_or_try_init(|| {
            let guild = self.guild()?;
            let mut channels = BTreeMap::new();
            for (&feed, &id) in self.config.webhook_channel_ids() {
                let channel = self.gateway.guild_channel(*guild.id(), id).ok_or_else(|| {
                    ResourceError::new(ResourceErrorKind::WebhookChannelMissing(feed.to_string()))
                })?;
                if *channel.kind() != ChannelKind::Text {
                    return Err(ResourceError::new(ResourceErrorKind::WebhookChannelNotText(
                        feed.to_string(),
                    )));
                }
                channels.insert(feed, channel);
            }
            debug!(count = channels.len(), "Resolved webhook channels");
            Ok(channels)
        })
    }

    /// The channel for one webhook feed.
    ///
    /// # Errors
    ///
    /// As [`webhook_channels`](Self::webhook_channels), plus
    /// `WebhookChannelMissing` when the feed is not configured.
    pub fn webhook_channel(&self, feed: WebhookFeedType) -> ResourceResult<Channel> {
        self.webhook_channels()?
            .get(&feed)
            .cloned()
            .ok_or_else(|| ResourceError::new(ResourceErrorKind::WebhookChannelMissing(feed.to_string())))
    }

    fn resolve_channel(
        &self,
        resource: &'static str,
        id: ChannelId,
        expected: ChannelKind,
    ) -> ResourceResult<Channel> {
        let channel = self.gateway.channel(id).ok_or_else(|| {
            ResourceError::new(ResourceErrorKind::ChannelNotFound {
                resource,
                id: id.get(),
            })
        })?;
        if *channel.kind() != expected {
            return Err(ResourceError::new(ResourceErrorKind::ChannelKindMismatch {
                resource,
                expected: expected.to_string(),
                found: channel.kind().to_string(),
            }));
        }
        Ok(channel)
    }
}

impl std::fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("config", &self.config)
            .field("ready", &self.ready)
            .field("guild", &self.guild)
            .field("log_channel", &self.log_channel)
            .field("help_channel", &self.help_channel)
            .field("webhook_channels", &self.webhook_channels)
            .finish_non_exhaustive()
    }
}
