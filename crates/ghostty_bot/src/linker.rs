//! Ties bot replies to the messages that triggered them.
//!
//! Components that answer a message with derived content keep a
//! [`MessageLinker`] so the answer follows the message: an edit rewrites or
//! removes the reply, and deleting the message deletes the reply.

use ghostty_error::GatewayResult;
use ghostty_gateway::{ChannelId, Gateway, Message, MessageId};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

/// A reply the bot sent, located by channel and id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkedReply {
    /// Channel the reply was sent to
    pub channel_id: ChannelId,
    /// The reply itself
    pub message_id: MessageId,
}

/// Original message id to the bot's reply.
#[derive(Debug, Default)]
pub struct MessageLinker {
    links: Mutex<HashMap<MessageId, LinkedReply>>,
}

impl MessageLinker {
    /// Create an empty linker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember that `reply` answers `original`. Replies land in the
    /// original's channel.
    pub fn link(&self, original: &Message, reply: MessageId) {
        self.links.lock().insert(
            *original.id(),
            LinkedReply {
                channel_id: *original.channel_id(),
                message_id: reply,
            },
        );
    }

    /// The reply linked to a message, if any.
    pub fn reply_for(&self, original: MessageId) -> Option<LinkedReply> {
        self.links.lock().get(&original).copied()
    }

    /// Forget the link of a message, returning its reply.
    pub fn unlink(&self, original: MessageId) -> Option<LinkedReply> {
        self.links.lock().remove(&original)
    }

    /// Number of tracked links.
    pub fn len(&self) -> usize {
        self.links.lock().len()
    }

    /// Whether nothing is linked.
    pub fn is_empty(&self) -> bool {
        self.links.lock().is_empty()
    }

    /// React to a deleted message.
    ///
    /// Deleting an original deletes its reply. Deleting a reply only drops
    /// the link, so a later edit of the original does not try to touch it.
    ///
    /// # Errors
    ///
    /// The gateway failed to delete the reply. The link is gone either way.
    pub async fn delete(&self, gateway: &dyn Gateway, message: MessageId) -> GatewayResult<()> {
        if let Some(reply) = self.unlink(message) {
            debug!(original = %message, reply = %reply.message_id, "Deleting linked reply");
            return gateway
                .delete_message(reply.channel_id, reply.message_id)
                .await;
        }
        self.links
            .lock()
            .retain(|_, reply| reply.message_id != message);
        Ok(())
    }

    /// Bring the reply of an edited message in step with its new content.
    ///
    /// `previous` is the reply body the old content produced (`None` when it
    /// produced nothing or is unknown) and `current` what the new content
    /// produces. A linked reply is rewritten, or deleted when the new content
    /// produces nothing. A message that never had a reply yields the body to
    /// post as a fresh reply; the caller sends it and links it. When the old
    /// content did produce a reply that is no longer linked, someone removed
    /// it and it stays removed.
    ///
    /// # Errors
    ///
    /// The gateway failed to edit or delete the reply.
    pub async fn edit(
        &self,
        gateway: &dyn Gateway,
        after: &Message,
        previous: Option<&str>,
        current: Option<String>,
    ) -> GatewayResult<Option<String>> {
        if previous == current.as_deref() {
            return Ok(None);
        }
        match (self.reply_for(*after.id()), current) {
            (Some(reply), Some(body)) => {
                gateway
                    .edit_message(reply.channel_id, reply.message_id, &body)
                    .await?;
                Ok(None)
            }
            (Some(reply), None) => {
                self.unlink(*after.id());
                gateway
                    .delete_message(reply.channel_id, reply.message_id)
                    .await?;
                Ok(None)
            }
            (None, Some(_)) if previous.is_some() => Ok(None),
            (None, body) => Ok(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghostty_gateway::{Account, GuildId, MemoryGateway, MessageKind};

    fn message(id: u64, content: &str) -> Message {
        Message::new(
            id,
            12,
            Some(GuildId(1)),
            Account::new(43, "user", false),
            MessageKind::Default,
            content,
        )
    }

    async fn linked(gateway: &MemoryGateway, linker: &MessageLinker, original: &Message) -> MessageId {
        let reply = gateway.reply(original, "reply").await.unwrap();
        linker.link(original, reply);
        reply
    }

    #[tokio::test]
    async fn test_deleting_original_deletes_reply() {
        let gateway = MemoryGateway::new();
        let linker = MessageLinker::new();
        let original = message(1, "original");
        let reply = linked(&gateway, &linker, &original).await;

        linker.delete(&gateway, MessageId(1)).await.unwrap();

        assert_eq!(gateway.deleted(), vec![reply]);
        assert!(linker.is_empty());
    }

    #[tokio::test]
    async fn test_deleting_reply_only_forgets_link() {
        let gateway = MemoryGateway::new();
        let linker = MessageLinker::new();
        let original = message(1, "original");
        let reply = linked(&gateway, &linker, &original).await;

        linker.delete(&gateway, reply).await.unwrap();

        assert!(gateway.deleted().is_empty());
        assert!(linker.reply_for(MessageId(1)).is_none());
    }

    #[tokio::test]
    async fn test_edit_rewrites_linked_reply() {
        let gateway = MemoryGateway::new();
        let linker = MessageLinker::new();
        let original = message(1, "original");
        let reply = linked(&gateway, &linker, &original).await;

        let fresh = linker
            .edit(&gateway, &original, Some("reply"), Some("rewritten".into()))
            .await
            .unwrap();

        assert!(fresh.is_none());
        let outbox = gateway.outbox();
        assert_eq!(outbox[0].id, reply);
        assert_eq!(outbox[0].content, "rewritten");
    }

    #[tokio::test]
    async fn test_edit_removing_content_deletes_reply() {
        let gateway = MemoryGateway::new();
        let linker = MessageLinker::new();
        let original = message(1, "original");
        let reply = linked(&gateway, &linker, &original).await;

        linker
            .edit(&gateway, &original, Some("reply"), None)
            .await
            .unwrap();

        assert_eq!(gateway.deleted(), vec![reply]);
        assert!(linker.is_empty());
    }

    #[tokio::test]
    async fn test_unchanged_output_is_left_alone() {
        let gateway = MemoryGateway::new();
        let linker = MessageLinker::new();
        let original = message(1, "original");
        linked(&gateway, &linker, &original).await;

        let fresh = linker
            .edit(&gateway, &original, Some("reply"), Some("reply".into()))
            .await
            .unwrap();

        assert!(fresh.is_none());
        assert_eq!(gateway.outbox()[0].content, "reply");
    }

    #[tokio::test]
    async fn test_edit_without_reply_asks_for_fresh_one() {
        let gateway = MemoryGateway::new();
        let linker = MessageLinker::new();
        let original = message(1, "now with a link");

        let fresh = linker
            .edit(&gateway, &original, None, Some("reply".into()))
            .await
            .unwrap();
        assert_eq!(fresh.as_deref(), Some("reply"));

        // The old content had a reply that is gone: it was removed on purpose.
        let removed = linker
            .edit(&gateway, &original, Some("old"), Some("reply".into()))
            .await
            .unwrap();
        assert!(removed.is_none());
    }
}
