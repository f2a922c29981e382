//! Runtime core of the Ghostty Discord bot.
//!
//! [`Bot`] is the top-level context. It owns the configuration, the gateway
//! handle, the extension loader, the resource and emoji caches and the
//! status collaborator, and implements the three entry points the gateway
//! drives:
//!
//! - [`Bot::setup_hook`] initializes status and loads every discovered
//!   extension concurrently before the gateway connects.
//! - [`Bot::on_ready`] marks resources resolvable and loads emojis once the
//!   gateway's guild cache is populated.
//! - [`Bot::on_message`] is the message gate in front of the filter pipeline.
//!
//! Edits and deletes are forwarded to components as events so replies can
//! follow the messages they answer (see [`linker`]).
//!
//! Built-in extensions live in [`components`]; administrative load, unload
//! and reload live in [`admin`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod admin;
mod bot;
pub mod components;
mod config;
#[cfg(feature = "discord")]
mod handler;
pub mod linker;
mod status;
pub mod telemetry;

pub use bot::{Bot, GateOutcome, MESSAGE_FILTER};
pub use config::{BotConfig, MessageFilterConfig};
#[cfg(feature = "discord")]
pub use handler::GhosttyHandler;
pub use status::BotStatus;
