//! Error types for the Ghostty bot runtime.
//!
//! # Error Hierarchy
//!
//! Errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! Every crate-level error converts into [`GhosttyError`], so callers that mix
//! gateway, extension and resource operations can use `?` throughout.
//!
//! # Examples
//!
//! ```
//! use ghostty_error::{GhosttyResult, ResourceError, ResourceErrorKind};
//!
//! fn primary_guild() -> GhosttyResult<u64> {
//!     Err(ResourceError::new(ResourceErrorKind::NoGuilds))?
//! }
//!
//! assert!(primary_guild().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod extension;
mod gateway;
mod resource;

pub use config::{ConfigError, ConfigErrorKind};
pub use error::{GhosttyError, GhosttyErrorKind, GhosttyResult};
pub use extension::{ExtensionError, ExtensionErrorKind, ExtensionResult};
pub use gateway::{GatewayError, GatewayErrorKind, GatewayResult};
pub use resource::{ResourceError, ResourceErrorKind, ResourceResult};
