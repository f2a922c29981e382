//! Serenity event handler driving the bot.

use crate::Bot;
use crate::admin::{self, AdminCommand, EXTENSION_OPTION};
use crate::telemetry::report_error;
use ghostty_gateway::{ChannelId, MessageId, conversions};
use serenity::all::{
    ChannelId as SerenityChannelId, CommandInteraction, CommandOptionType, Context, CreateCommand,
    CreateCommandOption, CreateInteractionResponse, CreateInteractionResponseMessage,
    EventHandler, GatewayIntents, GuildId as SerenityGuildId, Interaction, Message,
    MessageId as SerenityMessageId, MessageUpdateEvent, Ready,
};
use serenity::async_trait;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

/// Forwards gateway events to a [`Bot`].
pub struct GhosttyHandler {
    bot: Arc<Bot>,
}

impl GhosttyHandler {
    /// Create a handler for a bot.
    pub fn new(bot: Arc<Bot>) -> Self {
        Self { bot }
    }

    /// Gateway intents the bot needs.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MEMBERS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::GUILD_EMOJIS_AND_STICKERS
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }

    /// Slash commands for extension management.
    pub fn admin_commands() -> Vec<CreateCommand> {
        AdminCommand::iter()
            .map(|command| {
                CreateCommand::new(command.to_string())
                    .description(command.description())
                    .add_option(
                        CreateCommandOption::new(
                            CommandOptionType::String,
                            EXTENSION_OPTION,
                            "Extension name, e.g. fixup_embeds",
                        )
                        .required(true),
                    )
            })
            .collect()
    }

    async fn register_commands(&self, ctx: &Context) {
        let guild = match self.bot.resources().guild() {
            Ok(guild) => guild,
            Err(err) => {
                warn!(error = %err, "Cannot register commands without a guild");
                return;
            }
        };
        let id = SerenityGuildId::new(guild.id().get());
        match id.set_commands(&ctx.http, Self::admin_commands()).await {
            Ok(commands) => info!(count = commands.len(), guild = %guild.name(), "Registered commands"),
            Err(err) => self
                .bot
                .on_command_error("register", &anyhow::Error::new(err)),
        }
    }

    async fn run_command(&self, ctx: &Context, command: &CommandInteraction) {
        let name = command.data.name.as_str();
        let extension = command
            .data
            .options
            .iter()
            .find(|option| option.name == EXTENSION_OPTION)
            .and_then(|option| option.value.as_str());
        let actor = conversions::account(&command.user);

        let reply = match admin::invoke(&self.bot, name, &actor, extension).await {
            Ok(reply) => reply,
            Err(err) => {
                self.bot.on_command_error(name, &err);
                err.to_string()
            }
        };

        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(reply)
                .ephemeral(true),
        );
        if let Err(err) = command.create_response(&ctx.http, response).await {
            self.bot.on_command_error(name, &anyhow::Error::new(err));
        }
    }
}

#[async_trait]
impl EventHandler for GhosttyHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_user = %ready.user.name,
            guilds = ready.guilds.len(),
            "Bot connected to Discord"
        );
    }

    // Guilds arrive after `ready`; resources resolve only once all of them
    // are cached.
    async fn cache_ready(&self, ctx: Context, guilds: Vec<SerenityGuildId>) {
        debug!(guilds = guilds.len(), "Guild cache ready");
        let identity = conversions::account(&ctx.cache.current_user());
        if let Err(err) = self.bot.on_ready(&identity).await {
            report_error("on_ready", &anyhow::Error::new(err));
        }
        self.register_commands(&ctx).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            self.run_command(&ctx, &command).await;
        }
    }

    async fn message(&self, _ctx: Context, message: Message) {
        let message = conversions::message(&message);
        let outcome = self.bot.on_message(&message).await;
        debug!(message = %message.id(), %outcome, "Message handled");
    }

    async fn message_update(
        &self,
        ctx: Context,
        old_if_available: Option<Message>,
        new: Option<Message>,
        event: MessageUpdateEvent,
    ) {
        let after = match new {
            Some(message) => message,
            None => match event.channel_id.message(&ctx.http, event.id).await {
                Ok(message) => message,
                Err(err) => {
                    warn!(error = %err, message = %event.id, "Failed to fetch edited message");
                    return;
                }
            },
        };
        let before = old_if_available.as_ref().map(conversions::message);
        let after = conversions::message(&after);
        let outcome = self.bot.on_message_edit(before.as_ref(), &after).await;
        debug!(message = %after.id(), %outcome, "Edit handled");
    }

    async fn message_delete(
        &self,
        _ctx: Context,
        channel_id: SerenityChannelId,
        deleted_message_id: SerenityMessageId,
        _guild_id: Option<SerenityGuildId>,
    ) {
        self.bot
            .on_message_delete(
                ChannelId(channel_id.get()),
                MessageId(deleted_message_id.get()),
            )
            .await;
    }
}
