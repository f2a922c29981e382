//! Serenity-backed gateway.
//!
//! Available with the `discord` feature. The serenity client owns the
//! connection and the live cache; [`SerenityGateway`] only reads from that
//! cache and issues HTTP calls through the client's `Http` handle.

pub mod conversions;
mod gateway;

pub use gateway::SerenityGateway;
