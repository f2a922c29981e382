//! Replies with embed-friendly mirrors of social media links.
//!
//! Reddit links go to rxddit, X and Twitter to fixupx and fxtwitter, and
//! pixiv to phixiv. Links wrapped in `<...>` are left alone.
//!
//! The original message's own previews are suppressed so only the mirrors
//! show, and the reply follows later edits and deletion of the message.

use crate::Bot;
use crate::linker::MessageLinker;
use async_trait::async_trait;
use ghostty_extension::{Component, ExtensionDescriptor, SetupFuture};
use ghostty_gateway::{BotEvent, Gateway, Message};
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

const VALID_URI_CHARS: &str = r"[A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;%=]";

/// Most links per reply.
const MAX_LINKS: usize = 5;

/// Platform message length limit.
const MAX_LENGTH: usize = 2000;

const OMITTED_NOTICE: &str = "\n-# Some posts were omitted";

/// The extension's registry entry.
pub fn descriptor() -> ExtensionDescriptor<Bot> {
    ExtensionDescriptor::new(module_path!()).with_setup(setup)
}

fn setup(bot: Arc<Bot>) -> SetupFuture {
    Box::pin(async move {
        let component = FixupEmbeds::new(Arc::clone(bot.gateway()))?;
        Ok(vec![Arc::new(component) as Arc<dyn Component>])
    })
}

type Transform = fn(&Captures<'_>) -> Option<String>;

/// Reply text for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// Message body
    pub content: String,
    /// Number of links in the body
    pub links: usize,
}

/// The link rewriting component.
pub struct FixupEmbeds {
    gateway: Arc<dyn Gateway>,
    linker: MessageLinker,
    sites: Vec<(Regex, Transform)>,
    ignored: Regex,
}

impl FixupEmbeds {
    /// Compile the site patterns.
    ///
    /// # Errors
    ///
    /// A site pattern failed to compile.
    pub fn new(gateway: Arc<dyn Gateway>) -> Result<Self, regex::Error> {
        let reddit = Regex::new(&format!(
            r"https://(?:(?:www|(?P<skin>old|new)|\w\w|(?P<subdomain>[A-Za-z0-9_]+))\.)?reddit\.com/+(?P<subreddit>r/+[A-Za-z0-9_]+/+)?(?P<post>{VALID_URI_CHARS}+)"
        ))?;
        let twitter = Regex::new(&format!(
            r"https://(?:www\.)?(?P<site>x|twitter)\.com/(?P<post>{VALID_URI_CHARS}+/status/{VALID_URI_CHARS}+)"
        ))?;
        let pixiv = Regex::new(&format!(
            r"https://(?:www\.)?pixiv\.net/({VALID_URI_CHARS}+/{VALID_URI_CHARS}+)"
        ))?;
        let ignored = Regex::new(&format!(r"<https://{VALID_URI_CHARS}+>"))?;

        Ok(Self {
            gateway,
            linker: MessageLinker::new(),
            sites: vec![
                (reddit, reddit_link as Transform),
                (twitter, twitter_link),
                (pixiv, pixiv_link),
            ],
            ignored,
        })
    }

    /// Build the reply for a message body, if it has any rewritable links.
    pub fn rewrite(&self, content: &str) -> Option<Rewrite> {
        let content = self.ignored.replace_all(content, "");

        let mut seen = HashSet::new();
        let mut links: Vec<String> = self
            .sites
            .iter()
            .flat_map(|(pattern, transform)| {
                pattern
                    .captures_iter(&content)
                    .filter_map(|captures| transform(&captures))
                    .collect::<Vec<_>>()
            })
            .filter(|link| seen.insert(link.clone()))
            .collect();

        let mut omitted = links.len() > MAX_LINKS;
        links.truncate(MAX_LINKS);
        let mut body = links.join(" ");
        while body.len() > MAX_LENGTH {
            links.pop();
            omitted = true;
            body = links.join(" ");
        }

        if links.is_empty() {
            return None;
        }
        if omitted {
            body.push_str(OMITTED_NOTICE);
        }
        Some(Rewrite {
            content: body,
            links: links.len(),
        })
    }

    /// Replies tracked for later edits and deletes.
    pub fn linker(&self) -> &MessageLinker {
        &self.linker
    }

    async fn post(&self, message: &Message, body: &str) -> anyhow::Result<()> {
        self.gateway.suppress_embeds(message).await?;
        let reply = self.gateway.reply(message, body).await?;
        self.linker.link(message, reply);
        Ok(())
    }
}

// Post links carry the subreddit either as a subdomain or in the path, never
// both. Skins (old, new) survive; other subdomains become the subreddit.
fn reddit_link(captures: &Captures<'_>) -> Option<String> {
    let subdomain = captures.name("subdomain").map(|m| m.as_str());
    let subreddit = captures.name("subreddit").map(|m| m.as_str());
    if subdomain.is_some() == subreddit.is_some() {
        return None;
    }

    let skin = captures
        .name("skin")
        .map(|m| format!("{}.", m.as_str()))
        .unwrap_or_default();
    let subreddit = match (subreddit, subdomain) {
        (Some(path), _) => {
            let path = path.strip_prefix('r').unwrap_or(path);
            format!("r/{}", path.trim_matches('/'))
        }
        (None, Some(subdomain)) => format!("r/{}", subdomain),
        (None, None) => return None,
    };
    Some(format!(
        "https://{}rxddit.com/{}/{}",
        skin,
        subreddit,
        &captures["post"]
    ))
}

fn twitter_link(captures: &Captures<'_>) -> Option<String> {
    let mirror = if &captures["site"] == "x" {
        "fixupx"
    } else {
        "fxtwitter"
    };
    Some(format!("https://{}.com/{}", mirror, &captures["post"]))
}

fn pixiv_link(captures: &Captures<'_>) -> Option<String> {
    Some(format!("https://phixiv.net/{}", &captures[1]))
}

#[async_trait]
impl Component for FixupEmbeds {
    fn name(&self) -> &str {
        "FixupEmbeds"
    }

    #[instrument(skip_all, name = "fixup_embeds")]
    async fn handle_event(&self, event: &BotEvent) -> anyhow::Result<()> {
        match event {
            BotEvent::MessageFilterPassed(message) => {
                if let Some(rewrite) = self.rewrite(message.content()) {
                    debug!(links = rewrite.links, "Replying with fixed embeds");
                    self.post(message, &rewrite.content).await?;
                }
            }
            BotEvent::MessageEdited { before, after } => {
                let previous = before
                    .as_ref()
                    .and_then(|before| self.rewrite(before.content()))
                    .map(|rewrite| rewrite.content);
                let current = self.rewrite(after.content()).map(|rewrite| rewrite.content);
                if let Some(body) = self
                    .linker
                    .edit(self.gateway.as_ref(), after, previous.as_deref(), current)
                    .await?
                {
                    self.post(after, &body).await?;
                }
            }
            BotEvent::MessageDeleted { message_id, .. } => {
                self.linker
                    .delete(self.gateway.as_ref(), *message_id)
                    .await?;
            }
            _ => {}
        }
        Ok(())
    }
}
