//! Replies with the xkcd comics a message mentions as `xkcd#N`.
//!
//! Comics are fetched from xkcd's JSON API and kept for a while, including
//! the ones that do not exist and the ones that failed to load. Like link
//! fixups, the reply follows edits and deletion of the message.

use crate::Bot;
use crate::linker::MessageLinker;
use async_trait::async_trait;
use chrono::NaiveDate;
use derive_getters::Getters;
use futures::future::join_all;
use ghostty_extension::{Component, ExtensionDescriptor, SetupFuture};
use ghostty_gateway::{BotEvent, Gateway, Message};
use parking_lot::Mutex;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Where comics are fetched from.
pub const XKCD_URL: &str = "https://xkcd.com";

/// How long a lookup is reused before it is fetched again.
pub const REFRESH_AFTER: Duration = Duration::from_secs(12 * 60 * 60);

/// Most comics rendered in one reply, the omission notice included.
const MAX_COMICS: usize = 10;

/// Platform message length limit.
const MAX_LENGTH: usize = 2000;

const IMAGE_EXTENSIONS: [&str; 6] = ["avif", "gif", "jpeg", "jpg", "png", "webp"];

/// The extension's registry entry.
pub fn descriptor() -> ExtensionDescriptor<Bot> {
    ExtensionDescriptor::new(module_path!()).with_setup(setup)
}

fn setup(bot: Arc<Bot>) -> SetupFuture {
    Box::pin(async move {
        let component = XkcdMentions::new(Arc::clone(bot.gateway()), XkcdClient::new(XKCD_URL))?;
        Ok(vec![Arc::new(component) as Arc<dyn Component>])
    })
}

/// One comic as served by `info.0.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Getters)]
pub struct Comic {
    #[serde(rename = "num")]
    number: u32,
    day: String,
    month: String,
    year: String,
    title: String,
    img: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    transcript: String,
    alt: String,
    #[serde(default)]
    extra_parts: Option<serde_json::Value>,
}

impl Comic {
    /// The comic's page.
    pub fn url(&self) -> String {
        format!("https://xkcd.com/{}", self.number)
    }

    /// Publication date, when the API's fields parse.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            self.year.parse().ok()?,
            self.month.parse().ok()?,
            self.day.parse().ok()?,
        )
    }

    // Some interactive comics point `img` at a directory, which renders as
    // nothing. Only real image files are shown.
    fn has_image(&self) -> bool {
        self.img
            .rsplit_once('.')
            .is_some_and(|(_, extension)| IMAGE_EXTENSIONS.contains(&extension))
    }
}

/// Result of looking up one comic number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComicLookup {
    /// The comic exists
    Found(Box<Comic>),
    /// xkcd answered 404
    Unknown(u32),
    /// Any other failure
    FetchFailed(u32),
}

impl ComicLookup {
    /// Reply text for this lookup.
    pub fn render(&self) -> String {
        match self {
            Self::Found(comic) => {
                let url = comic.url();
                let mut lines = vec![format!("**[{}](<{}>)**", comic.title, url)];
                if comic.has_image() {
                    lines.push(comic.img.clone());
                } else if !comic.transcript.is_empty() {
                    lines.push(comic.transcript.clone());
                }
                if comic.extra_parts.is_some() {
                    lines.push(format!(
                        "*This is an interactive comic; [press here](<{}>) to view it on xkcd.com.*",
                        url
                    ));
                }
                if !comic.link.is_empty() {
                    lines.push(format!("[Press here](<{}>) to view the image's link.", comic.link));
                }
                let footer = match comic.date() {
                    Some(date) => format!("-# {} • {}", comic.alt, date.format("%B %-d, %Y")),
                    None => format!("-# {}", comic.alt),
                };
                lines.push(footer);
                lines.join("\n")
            }
            Self::Unknown(number) => format!("-# xkcd #{} does not exist", number),
            Self::FetchFailed(number) => format!("-# Unable to fetch xkcd #{}", number),
        }
    }
}

/// HTTP client for xkcd's JSON API.
#[derive(Debug, Clone)]
pub struct XkcdClient {
    client: Client,
    base_url: String,
}

impl XkcdClient {
    /// Create a client against a base URL such as [`XKCD_URL`].
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch one comic. Never fails; failures are part of the lookup.
    #[instrument(skip(self))]
    pub async fn fetch(&self, number: u32) -> ComicLookup {
        let url = format!("{}/{}/info.0.json", self.base_url, number);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Failed to reach xkcd");
                return ComicLookup::FetchFailed(number);
            }
        };

        match response.status() {
            status if status.is_success() => match response.json::<Comic>().await {
                Ok(comic) => ComicLookup::Found(Box::new(comic)),
                Err(e) => {
                    warn!(error = %e, "Failed to parse xkcd response");
                    ComicLookup::FetchFailed(number)
                }
            },
            StatusCode::NOT_FOUND => ComicLookup::Unknown(number),
            status => {
                warn!(status = %status, "xkcd returned an error");
                ComicLookup::FetchFailed(number)
            }
        }
    }
}

/// Lookups by comic number, refetched once they are older than the refresh
/// interval.
#[derive(Debug)]
pub struct ComicCache {
    client: XkcdClient,
    refresh_after: Duration,
    entries: Mutex<HashMap<u32, (Instant, ComicLookup)>>,
}

impl ComicCache {
    /// Create an empty cache.
    pub fn new(client: XkcdClient, refresh_after: Duration) -> Self {
        Self {
            client,
            refresh_after,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The cached lookup for a comic, fetching it when absent or stale.
    pub async fn get(&self, number: u32) -> ComicLookup {
        let cached = self
            .entries
            .lock()
            .get(&number)
            .filter(|(fetched, _)| fetched.elapsed() < self.refresh_after)
            .map(|(_, lookup)| lookup.clone());
        if let Some(lookup) = cached {
            return lookup;
        }
        let lookup = self.client.fetch(number).await;
        self.entries
            .lock()
            .insert(number, (Instant::now(), lookup.clone()));
        lookup
    }
}

/// The xkcd mention component.
pub struct XkcdMentions {
    gateway: Arc<dyn Gateway>,
    cache: ComicCache,
    linker: MessageLinker,
    mention: Regex,
}

impl XkcdMentions {
    /// Create the component.
    ///
    /// # Errors
    ///
    /// The mention pattern failed to compile.
    pub fn new(gateway: Arc<dyn Gateway>, client: XkcdClient) -> Result<Self, regex::Error> {
        Ok(Self {
            gateway,
            cache: ComicCache::new(client, REFRESH_AFTER),
            linker: MessageLinker::new(),
            mention: Regex::new(r"(?i)\bxkcd#(\d+)")?,
        })
    }

    /// Replies tracked for later edits and deletes.
    pub fn linker(&self) -> &MessageLinker {
        &self.linker
    }

    /// Comic numbers mentioned in a message body, first mention first.
    pub fn mentions(&self, content: &str) -> Vec<u32> {
        let mut seen = HashSet::new();
        self.mention
            .captures_iter(content)
            .filter_map(|captures| captures[1].parse().ok())
            .filter(|number| seen.insert(*number))
            .collect()
    }

    /// Build the reply for a message body, if it mentions any comic.
    pub async fn reply_for(&self, content: &str) -> Option<String> {
        let numbers = self.mentions(content);
        if numbers.is_empty() {
            return None;
        }
        let lookups = join_all(numbers.iter().map(|&number| self.cache.get(number))).await;
        Some(compose(lookups.iter().map(ComicLookup::render).collect()))
    }

    async fn post(&self, message: &Message, body: &str) -> anyhow::Result<()> {
        let reply = self.gateway.reply(message, body).await?;
        self.linker.link(message, reply);
        Ok(())
    }
}

// Keeps the reply within the comic and length limits, replacing whatever
// does not fit with a count of omitted comics.
fn compose(mut parts: Vec<String>) -> String {
    let total = parts.len();
    if total > MAX_COMICS {
        parts.truncate(MAX_COMICS - 1);
    }
    loop {
        let omitted = total - parts.len();
        let mut body = parts.join("\n\n");
        if omitted > 0 {
            body.push_str(&format!("\n\n-# {} xkcd comics were omitted", omitted));
        }
        if body.len() <= MAX_LENGTH || parts.len() <= 1 {
            return body;
        }
        parts.pop();
    }
}

#[async_trait]
impl Component for XkcdMentions {
    fn name(&self) -> &str {
        "XkcdMentions"
    }

    #[instrument(skip_all, name = "xkcd_mentions")]
    async fn handle_event(&self, event: &BotEvent) -> anyhow::Result<()> {
        match event {
            BotEvent::MessageFilterPassed(message) => {
                if let Some(body) = self.reply_for(message.content()).await {
                    debug!("Replying with xkcd comics");
                    self.post(message, &body).await?;
                }
            }
            BotEvent::MessageEdited { before, after } => {
                let previous = match before {
                    Some(before) => self.reply_for(before.content()).await,
                    None => None,
                };
                let current = self.reply_for(after.content()).await;
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
