//! pixelbot command-line frontend: configuration loading, reference
//! recognition/transport backends, and the subcommand handlers.

#![deny(clippy::all)]

pub mod backends;
pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;

pub use config::AppConfig;
pub use error::CliError;
