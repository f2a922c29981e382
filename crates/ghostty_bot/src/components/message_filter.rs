//! Suppresses messages that match the configured content policy.

use crate::{Bot, MESSAGE_FILTER, MessageFilterConfig};
use anyhow::Context;
use async_trait::async_trait;
use ghostty_extension::{Component, ExtensionDescriptor, MessageFilter, SetupFuture};
use ghostty_gateway::Message;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, instrument};

/// The extension's registry entry.
pub fn descriptor() -> ExtensionDescriptor<Bot> {
    ExtensionDescriptor::new(module_path!()).with_setup(setup)
}

fn setup(bot: Arc<Bot>) -> SetupFuture {
    Box::pin(async move {
        let filter = ContentPolicy::new(bot.config().message_filter())?;
        Ok(vec![Arc::new(filter) as Arc<dyn Component>])
    })
}

/// Compiled form of [`MessageFilterConfig`].
#[derive(Debug)]
pub struct ContentPolicy {
    prohibited: Vec<Regex>,
    block_mass_mentions: bool,
}

impl ContentPolicy {
    /// Compile a policy.
    ///
    /// # Errors
    ///
    /// A prohibited pattern is not a valid regex.
    pub fn new(config: &MessageFilterConfig) -> anyhow::Result<Self> {
        let prohibited = config
            .prohibited_patterns()
            .iter()
            .map(|pattern| {
                Regex::new(pattern).with_context(|| format!("Invalid regex pattern '{}'", pattern))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self {
            prohibited,
            block_mass_mentions: *config.block_mass_mentions(),
        })
    }
}

impl MessageFilter for ContentPolicy {
    #[instrument(skip_all, fields(message = %message.id()))]
    fn check(&self, message: &Message) -> bool {
        let content = message.content();

        if self.block_mass_mentions && (content.contains("@everyone") || content.contains("@here")) {
            debug!("Message contains mass mention");
            return true;
        }

        if let Some(index) = self.prohibited.iter().position(|regex| regex.is_match(content)) {
            debug!(pattern_index = index, "Message matches prohibited pattern");
            return true;
        }

        false
    }
}

#[async_trait]
impl Component for ContentPolicy {
    fn name(&self) -> &str {
        MESSAGE_FILTER
    }

    fn message_filter(&self) -> Option<&dyn MessageFilter> {
        Some(self)
    }
}
