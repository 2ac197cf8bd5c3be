//! Error types for the oracle command line.

use korro_auth::AuthorizationError;

/// Errors that can occur while running an oracle command.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    ConfigRead {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`OracleConfig`](crate::config::OracleConfig).
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The RPC URL does not parse.
    #[error("invalid RPC URL {url}: {reason}")]
    InvalidRpcUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No usable signing key was configured.
    #[error("signer_private_key not resolved (missing env var?)")]
    MissingSigningKey,

    /// Neither an oracle address nor a signing key was configured.
    #[error("oracle address unknown: set oracle_address or signer_private_key")]
    MissingOracleAddress,

    /// Reading a payload from disk or stdin failed.
    #[error("cannot read payload: {0}")]
    PayloadRead(#[from] std::io::Error),

    /// A payload is not a valid authorization.
    #[error("invalid payload: {0}")]
    PayloadParse(#[from] serde_json::Error),

    /// Conversion, signing or verification failed.
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
}
