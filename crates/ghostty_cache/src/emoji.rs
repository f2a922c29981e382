//! Semantic emoji labels resolved against the primary guild.

use crate::ResourceCache;
use ghostty_error::ResourceResult;
use ghostty_gateway::Emoji;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{debug, instrument, warn};

/// Glyph shown in place of an emoji the guild does not have.
pub const PLACEHOLDER: &str = "❓";

/// The fixed set of emojis the bot uses, named as they are uploaded.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[allow(missing_docs)]
pub enum EmojiName {
    Commit,
    Discussion,
    DiscussionAnswered,
    DiscussionDuplicate,
    DiscussionOutdated,
    IssueClosedCompleted,
    IssueClosedUnplanned,
    IssueOpen,
    PullClosed,
    PullDraft,
    PullMerged,
    PullOpen,
}

/// What a label resolved to.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum EmojiEntry {
    /// The guild's custom emoji
    #[display("{}", _0)]
    Custom(Emoji),
    /// The guild has no emoji with this name
    #[display("{}", PLACEHOLDER)]
    Placeholder,
}

impl EmojiEntry {
    /// Whether the label fell back to the placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}

type EmojiMap = HashMap<EmojiName, EmojiEntry>;

/// Read-only handle onto the emoji mapping.
///
/// Cheap to clone. Reflects the most recent [`EmojiCache::load`].
#[derive(Debug, Clone)]
pub struct EmojiView {
    inner: Arc<RwLock<EmojiMap>>,
}

impl EmojiView {
    /// The entry for a label, or `None` before the first load.
    pub fn get(&self, name: EmojiName) -> Option<EmojiEntry> {
        self.inner.read().get(&name).cloned()
    }

    /// Render a label for a message, falling back to the placeholder.
    pub fn render(&self, name: EmojiName) -> String {
        self.get(name)
            .unwrap_or(EmojiEntry::Placeholder)
            .to_string()
    }

    /// Whether a load has populated the mapping.
    pub fn is_loaded(&self) -> bool {
        !self.inner.read().is_empty()
    }
}

/// Owner of the emoji mapping; the only thing that writes it.
#[derive(Debug, Default)]
pub struct EmojiCache {
    inner: Arc<RwLock<EmojiMap>>,
}

impl EmojiCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// A read-only view for components.
    pub fn view(&self) -> EmojiView {
        EmojiView {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Rebuild the mapping from the primary guild's current emojis.
    ///
    /// Labels without a matching emoji get the placeholder, and a single
    /// message listing all of them goes to the log channel. A failure to
    /// deliver that message is logged and otherwise ignored.
    ///
    /// Returns the missing labels in sorted order.
    ///
    /// # Errors
    ///
    /// Any error resolving the primary guild or, when labels are missing,
    /// the log channel.
    #[instrument(skip_all)]
    pub async fn load(&self, resources: &ResourceCache) -> ResourceResult<Vec<EmojiName>> {
        let guild = resources.guild()?;
        let emojis = resources.gateway().guild_emojis(*guild.id());

        let mut mapping = EmojiMap::new();
        for emoji in emojis {
            if let Ok(name) = EmojiName::from_str(emoji.name()) {
                mapping.insert(name, EmojiEntry::Custom(emoji));
            }
        }

        let found: BTreeSet<EmojiName> = mapping.keys().copied().collect();
        let missing: Vec<EmojiName> = EmojiName::iter()
            .filter(|name| !found.contains(name))
            .collect();
        for &name in &missing {
            mapping.insert(name, EmojiEntry::Placeholder);
        }

        *self.inner.write() = mapping;
        debug!(found = found.len(), missing = missing.len(), "Loaded emojis");

        if !missing.is_empty() {
            let names = missing
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            let report = format!("Failed to load the following emojis: {}", names);
            warn!("{}", report);

            let log_channel = resources.log_channel()?;
            if let Err(err) = resources
                .gateway()
                .send_message(*log_channel.id(), &report)
                .await
            {
                warn!(error = %err, "Failed to report missing emojis");
            }
        }
        Ok(missing)
    }
}
