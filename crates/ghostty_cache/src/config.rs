//! Ids the resource cache resolves.

use derive_getters::Getters;
use ghostty_gateway::{ChannelId, GuildId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of webhook feed a channel receives.
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
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WebhookFeedType {
    /// Repository activity
    Main,
    /// Discussion activity
    Discussions,
}

/// Configured ids of the resources the bot depends on.
///
/// Immutable once the bot starts.
///
/// # Example
///
/// ```
/// use ghostty_cache::{ResourceConfig, WebhookFeedType};
/// use ghostty_gateway::ChannelId;
///
/// let config = ResourceConfig::new(ChannelId(10), ChannelId(20))
///     .with_webhook_channel(WebhookFeedType::Main, ChannelId(30));
/// assert_eq!(config.webhook_channel_ids().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct ResourceConfig {
    /// Preferred primary guild
    #[serde(default)]
    guild_id: Option<GuildId>,

    /// Text channel receiving the bot's own reports
    log_channel_id: ChannelId,

    /// Forum channel for help threads
    help_channel_id: ChannelId,

    /// Channel per webhook feed, all inside the primary guild
    #[serde(default)]
    #[setters(skip)]
    webhook_channel_ids: BTreeMap<WebhookFeedType, ChannelId>,
}

impl ResourceConfig {
    /// Create a config with no preferred guild and no webhook feeds.
    pub fn new(log_channel_id: ChannelId, help_channel_id: ChannelId) -> Self {
        Self {
            guild_id: None,
            log_channel_id,
            help_channel_id,
            webhook_channel_ids: BTreeMap::new(),
        }
    }

    /// Route a webhook feed to a channel.
    pub fn with_webhook_channel(mut self, feed: WebhookFeedType, channel: ChannelId) -> Self {
        self.webhook_channel_ids.insert(feed, channel);
        self
    }
}
