//! Bot configuration loaded from file and environment.

use config::{Config, Environment, File};
use derive_getters::Getters;
use ghostty_cache::{ResourceConfig, WebhookFeedType};
use ghostty_error::{ConfigError, ConfigErrorKind, GhosttyResult};
use ghostty_gateway::{ChannelId, GuildId, RoleId};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, instrument};

/// Default config file, looked up in the working directory.
const CONFIG_FILE: &str = "ghostty_bot";

/// Prefix of environment overrides, e.g. `BOT_TOKEN`.
const ENV_PREFIX: &str = "BOT";

/// Policy of the built-in message filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct MessageFilterConfig {
    /// Messages matching any of these regexes are suppressed
    #[serde(default)]
    prohibited_patterns: Vec<String>,

    /// Suppress @everyone and @here
    #[serde(default = "default_true")]
    block_mass_mentions: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MessageFilterConfig {
    fn default() -> Self {
        Self {
            prohibited_patterns: vec![],
            block_mass_mentions: true,
        }
    }
}

impl MessageFilterConfig {
    /// Create a policy from patterns.
    pub fn new(prohibited_patterns: Vec<String>, block_mass_mentions: bool) -> Self {
        Self {
            prohibited_patterns,
            block_mass_mentions,
        }
    }
}

/// Everything the bot reads at startup.
///
/// Immutable for the lifetime of the process.
#[derive(Clone, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct BotConfig {
    /// Gateway authentication token
    token: String,

    /// Preferred primary guild; the first guild is used when unset
    #[serde(default)]
    guild_id: Option<GuildId>,

    /// Text channel for the bot's own reports
    log_channel_id: ChannelId,

    /// Forum channel for help threads
    help_channel_id: ChannelId,

    /// Role whose members may manage extensions
    #[serde(default)]
    mod_role_id: Option<RoleId>,

    /// Channel per webhook feed
    #[serde(default)]
    webhook_channel_ids: BTreeMap<WebhookFeedType, ChannelId>,

    /// Built-in message filter policy
    #[serde(default)]
    message_filter: MessageFilterConfig,

    /// Emit logs as JSON
    #[serde(default)]
    json_logs: bool,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("guild_id", &self.guild_id)
            .field("log_channel_id", &self.log_channel_id)
            .field("help_channel_id", &self.help_channel_id)
            .field("mod_role_id", &self.mod_role_id)
            .field("webhook_channel_ids", &self.webhook_channel_ids)
            .field("message_filter", &self.message_filter)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

impl BotConfig {
    /// Create a config with the required fields and defaults elsewhere.
    pub fn new(
        token: impl Into<String>,
        log_channel_id: ChannelId,
        help_channel_id: ChannelId,
    ) -> Self {
        Self {
            token: token.into(),
            guild_id: None,
            log_channel_id,
            help_channel_id,
            mod_role_id: None,
            webhook_channel_ids: BTreeMap::new(),
            message_filter: MessageFilterConfig::default(),
            json_logs: false,
        }
    }

    /// Load configuration.
    ///
    /// Sources, lowest precedence first:
    /// - `path` if given, otherwise an optional `ghostty_bot.toml` in the
    ///   working directory
    /// - environment variables prefixed `BOT_`, with `__` separating nested
    ///   keys (`BOT_WEBHOOK_CHANNEL_IDS__MAIN`)
    ///
    /// A `.env` file, when present, is read into the environment first.
    #[instrument]
    pub fn load(path: Option<&Path>) -> GhosttyResult<Self> {
        if let Ok(env_file) = dotenvy::dotenv() {
            debug!(file = %env_file.display(), "Loaded environment file");
        }

        let file = match path {
            Some(path) => File::from(path),
            None => File::with_name(CONFIG_FILE).required(false),
        };

        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Build(e.to_string())))?
            .try_deserialize::<Self>()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Parse(e.to_string())))?;

        debug!(config = ?config, "Configuration loaded");
        Ok(config)
    }

    /// Reject configurations the bot cannot start with.
    ///
    /// # Errors
    ///
    /// An empty token or a message filter pattern that is not a valid regex.
    pub fn validate(&self) -> GhosttyResult<()> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::new(ConfigErrorKind::EmptyToken).into());
        }
        for pattern in self.message_filter.prohibited_patterns() {
            Regex::new(pattern).map_err(|e| {
                ConfigError::new(ConfigErrorKind::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })?;
        }
        Ok(())
    }

    /// The ids the resource cache resolves.
    pub fn resources(&self) -> ResourceConfig {
        self.webhook_channel_ids.iter().fold(
            ResourceConfig::new(self.log_channel_id, self.help_channel_id)
                .with_guild_id(self.guild_id),
            |resources, (&feed, &channel)| resources.with_webhook_channel(feed, channel),
        )
    }
}
