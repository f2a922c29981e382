//! Moderator commands for managing extensions at runtime.
//!
//! The gateway handler registers one slash command per [`AdminCommand`],
//! each taking the extension name as its [`EXTENSION_OPTION`] argument, and
//! routes invocations through [`invoke`].

use crate::Bot;
use crate::components::NAMESPACE;
use ghostty_extension::{LoadOutcome, Operation};
use ghostty_gateway::Account;
use std::sync::Arc;
use tracing::{info, instrument};

/// Name of the argument carrying the extension name.
pub const EXTENSION_OPTION: &str = "extension";

/// An extension management command.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum AdminCommand {
    /// Activate an extension
    Load,
    /// Deactivate an extension
    Unload,
    /// Deactivate, then activate again
    Reload,
}

impl AdminCommand {
    /// One-line description shown in the command picker.
    pub fn description(self) -> &'static str {
        match self {
            Self::Load => "Load an extension",
            Self::Unload => "Unload an extension",
            Self::Reload => "Reload an extension",
        }
    }
}

/// Run a command invocation as it arrives from the gateway.
///
/// # Errors
///
/// The command name is not an [`AdminCommand`] or the extension argument is
/// missing. Refusals and failed loads are not errors; they are described in
/// the returned reply.
pub async fn invoke(
    bot: &Arc<Bot>,
    command: &str,
    actor: &Account,
    extension: Option<&str>,
) -> anyhow::Result<String> {
    let parsed: AdminCommand = command
        .parse()
        .map_err(|_| anyhow::anyhow!("Unknown command `{}`", command))?;
    let Some(extension) = extension else {
        anyhow::bail!("`{}` needs an extension name", command);
    };
    Ok(run(bot, parsed, actor, extension).await)
}

/// Expand a short extension name (`fixup_embeds`) to its full path.
pub fn qualify(name: &str) -> String {
    if name.starts_with(NAMESPACE) {
        name.to_string()
    } else {
        format!("{}{}", NAMESPACE, name)
    }
}

/// Run an extension command on behalf of `actor` and describe the result.
///
/// Only moderators may run these. The name is checked against the registry
/// first so a typo gets "not a valid extension" rather than a load error.
///
/// Reload is unload followed by load. If the load fails, the extension stays
/// unloaded.
#[instrument(skip(bot, actor), fields(actor = %actor))]
pub async fn run(bot: &Arc<Bot>, command: AdminCommand, actor: &Account, name: &str) -> String {
    if !bot.is_mod(actor) {
        return "You must be a moderator to manage extensions.".to_string();
    }

    let name = qualify(name);
    if !bot.extensions().registry().is_valid_extension(&name) {
        return format!("`{}` is not a valid extension.", name);
    }

    let reply = match command {
        AdminCommand::Load => describe(
            bot.attempt_extension(Operation::Load, &name, Some(actor)).await,
            "Loaded",
            Operation::Load,
            &name,
        ),
        AdminCommand::Unload => describe(
            bot.attempt_extension(Operation::Unload, &name, Some(actor)).await,
            "Unloaded",
            Operation::Unload,
            &name,
        ),
        AdminCommand::Reload => {
            let unloaded = bot
                .attempt_extension(Operation::Unload, &name, Some(actor))
                .await;
            if !unloaded.is_success() {
                describe(unloaded, "Unloaded", Operation::Unload, &name)
            } else {
                match bot
                    .attempt_extension(Operation::Load, &name, Some(actor))
                    .await
                {
                    LoadOutcome::Success => format!("Reloaded `{}`.", name),
                    LoadOutcome::Failure(err) => format!(
                        "Unloaded `{}` but failed to load it again: {}",
                        name,
                        err.reason()
                    ),
                }
            }
        }
    };
    info!("{} ran {} on `{}`", actor, command, name);
    reply
}

fn describe(outcome: LoadOutcome, done: &str, operation: Operation, name: &str) -> String {
    match outcome {
        LoadOutcome::Success => format!("{} `{}`.", done, name),
        LoadOutcome::Failure(err) => {
            format!("Failed to {} `{}`: {}", operation, name, err.reason())
        }
    }
}
