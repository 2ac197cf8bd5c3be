//! Command line interface.

use std::path::PathBuf;

use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use korro_auth::HashVariant;

/// Quote and verify signed purchase authorizations.
#[derive(Debug, Parser)]
#[command(name = "korro-oracle", version, about)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "CONFIG", default_value = "korro.toml", global = true)]
    pub config: PathBuf,

    /// Overrides the configured JSON-RPC endpoint.
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Overrides the configured hash convention (`raw` or `prefixed`).
    #[arg(long, value_parser = parse_variant, global = true)]
    pub variant: Option<HashVariant>,

    #[command(subcommand)]
    pub command: Command,
}

/// Oracle subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign a price authorization bound to the current block and print it as JSON.
    Quote {
        /// Purchase price in fiat, e.g. `0.5`.
        #[arg(long)]
        price: String,
        /// VAT in fiat, e.g. `10`.
        #[arg(long)]
        vat: String,
        /// Fiat per whole unit of the chain currency, e.g. `450`.
        #[arg(long)]
        rate: String,
        /// Fiat currency code; defaults to the configured one.
        #[arg(long)]
        currency: Option<String>,
    },
    /// Check a JSON authorization the way the purchase contract would.
    Verify {
        /// File holding the JSON authorization, or `-` for stdin.
        #[arg(long, default_value = "-")]
        payload: PathBuf,
        /// Value attached to the purchase, in smallest units.
        #[arg(long)]
        submitted: String,
        /// Expected oracle address; defaults to the configured one.
        #[arg(long)]
        oracle: Option<Address>,
        /// Chain height to check freshness against; queried over RPC if omitted.
        #[arg(long)]
        height: Option<u64>,
    },
    /// Print the oracle address derived from the configured key.
    Address,
}

fn parse_variant(s: &str) -> Result<HashVariant, String> {
    match s {
        "raw" | "noprefix" => Ok(HashVariant::Raw),
        "prefixed" | "personal" | "personalMessagePrefixed" => {
            Ok(HashVariant::PersonalMessagePrefixed)
        }
        other => Err(format!("unknown hash variant {other:?} (expected raw or prefixed)")),
    }
}
