//! AuditVerse command-line front end
//!
//! Library half of the `auditverse` binary: configuration, logging setup,
//! the clap command tree, and one function per subcommand.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;

pub use config::{ConfigError, ViewerConfig, DEFAULT_CONFIG_FILE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
