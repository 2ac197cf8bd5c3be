//! Price oracle command line.
//!
//! Wires the `korro-auth` core to real collaborators: a JSON-RPC endpoint for
//! the chain height and a configured signing key.
//!
//! # Modules
//!
//! - [`cli`] — Command line arguments
//! - [`commands`] — Quote and verify logic behind the subcommands
//! - [`config`] — TOML configuration with environment variable expansion
//! - [`custody`] — Key custody backed by the configured key
//! - [`error`] — Command error types

pub mod cli;
pub mod commands;
pub mod config;
pub mod custody;
pub mod error;

pub use config::OracleConfig;
pub use error::OracleError;
