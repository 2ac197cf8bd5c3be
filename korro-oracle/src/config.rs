//! Oracle configuration.
//!
//! Loads configuration from a TOML file with support for environment variable
//! expansion in string values. Variables use `$VAR` or `${VAR}` syntax, so the
//! signing key can stay out of the file.
//!
//! # Example Configuration
//!
//! ```toml
//! rpc_url = "http://localhost:7545"
//! signer_private_key = "$ORACLE_SIGNER_KEY"
//! variant = "personalMessagePrefixed"
//! max_age_blocks = 256
//! currency = "EUR"
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` — Path to configuration file (default: `korro.toml`)
//! - `RPC_URL` — Override the RPC endpoint
//! - Signer keys referenced by `$VAR` in the config file

use std::path::Path;

use alloy_primitives::Address;
use korro_auth::{FreshnessWindow, HashVariant};
use serde::Deserialize;

use crate::error::OracleError;

/// Top-level oracle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OracleConfig {
    /// HTTP JSON-RPC endpoint used to read the chain height.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Oracle signing key (hex, with or without `0x` prefix).
    /// Supports `$VAR` / `${VAR}` for environment variable expansion.
    #[serde(default)]
    pub signer_private_key: Option<String>,

    /// Address authorizations must recover to. Derived from the signing key
    /// when not set.
    #[serde(default)]
    pub oracle_address: Option<Address>,

    /// Hash convention to sign and verify under.
    #[serde(default)]
    pub variant: HashVariant,

    /// Maximum age in blocks of an acceptable authorization.
    #[serde(default = "default_max_age_blocks")]
    pub max_age_blocks: u64,

    /// Currency code fiat prices are quoted in.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_rpc_url() -> String {
    "http://localhost:7545".to_owned()
}

const fn default_max_age_blocks() -> u64 {
    korro_auth::freshness::DEFAULT_MAX_AGE_BLOCKS
}

fn default_currency() -> String {
    "USD".to_owned()
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            signer_private_key: None,
            oracle_address: None,
            variant: HashVariant::default(),
            max_age_blocks: default_max_age_blocks(),
            currency: default_currency(),
        }
    }
}

impl OracleConfig {
    /// Loads configuration from `path`, expanding variables from the process
    /// environment. A missing file yields the defaults. `RPC_URL` overrides the
    /// file value.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, OracleError> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// Like [`load_from`](Self::load_from), with variables and the `RPC_URL`
    /// override resolved through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_with<F>(path: &Path, lookup: F) -> Result<Self, OracleError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let content = if path.exists() {
            std::fs::read_to_string(path).map_err(|source| OracleError::ConfigRead {
                path: path.display().to_string(),
                source,
            })?
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            String::new()
        };

        let mut config = Self::from_toml_str(&content, &lookup)?;
        if let Some(url) = lookup("RPC_URL") {
            config.rpc_url = url;
        }
        Ok(config)
    }

    /// Parses configuration from a TOML string, resolving `$VAR` references
    /// through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::ConfigParse`] on invalid TOML.
    pub fn from_toml_str<F>(content: &str, lookup: F) -> Result<Self, OracleError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = expand_env_vars(content, lookup);
        Ok(toml::from_str(&expanded)?)
    }

    /// The freshness window described by `max_age_blocks`.
    #[must_use]
    pub const fn freshness_window(&self) -> FreshnessWindow {
        FreshnessWindow::new(self.max_age_blocks)
    }

    /// The configured signing key, if it was resolved.
    ///
    /// Returns `None` for a missing, empty, or still-unexpanded (`$VAR`) value.
    #[must_use]
    pub fn resolved_signer_key(&self) -> Option<&str> {
        self.signer_private_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.starts_with('$'))
    }
}

/// Expands `$VAR` and `${VAR}` patterns in a string using `lookup`.
///
/// Unresolved variables are left as-is.
fn expand_env_vars<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }

        let mut var_name = String::new();
        while let Some(&c) = chars.peek() {
            if braced {
                if c == '}' {
                    chars.next();
                    break;
                }
            } else if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            var_name.push(c);
            chars.next();
        }

        match lookup(&var_name).filter(|_| !var_name.is_empty()) {
            Some(value) => result.push_str(&value),
            None => {
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&var_name);
                if braced && !var_name.is_empty() {
                    result.push('}');
                }
            }
        }
    }

    result
}
