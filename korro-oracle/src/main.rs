//! Price oracle command line.
//!
//! # Usage
//!
//! ```bash
//! # Sign a quote bound to the current block
//! ORACLE_SIGNER_KEY=0x… korro-oracle quote --price 0.5 --vat 10 --rate 450 > auth.json
//!
//! # Check it the way the purchase contract would
//! korro-oracle verify --payload auth.json --submitted 23333333333333333
//!
//! # Configure logging level
//! RUST_LOG=debug korro-oracle address
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` — Path to TOML configuration file (default: `korro.toml`)
//! - `RPC_URL` — Override the JSON-RPC endpoint
//! - `RUST_LOG` — Log level filter (default: `info`)
//!
//! A `.env` file in the working directory is loaded first.

use alloy_provider::ProviderBuilder;
use alloy_transport_http::reqwest::Url;
use clap::Parser;
use korro_auth::chain::ProviderHeightSource;
use korro_auth::{BlockHeight, ChainHeightSource, KeyCustody, Oracle};
use tracing_subscriber::EnvFilter;

use korro_oracle::cli::{Cli, Command};
use korro_oracle::commands::{self, QuoteRequest};
use korro_oracle::config::OracleConfig;
use korro_oracle::custody::{LocalKeyCustody, expected_oracle_address};
use korro_oracle::error::OracleError;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout carries only command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("korro-oracle failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), OracleError> {
    let mut config = OracleConfig::load_from(&cli.config)?;
    if let Some(url) = cli.rpc_url {
        config.rpc_url = url;
    }
    if let Some(variant) = cli.variant {
        config.variant = variant;
    }
    tracing::debug!(
        rpc_url = %config.rpc_url,
        variant = %config.variant,
        max_age_blocks = config.max_age_blocks,
        "Loaded configuration"
    );

    match cli.command {
        Command::Quote {
            price,
            vat,
            rate,
            currency,
        } => {
            let custody = LocalKeyCustody::from_config(&config)?;
            tracing::info!(oracle = %custody.oracle_address(), "Using oracle key");
            let oracle = Oracle::new(height_source(&config)?, custody, config.variant);
            let request = QuoteRequest {
                price,
                vat,
                rate,
                currency: currency.unwrap_or_else(|| config.currency.clone()),
            };
            let auth = commands::quote(&oracle, &request).await?;
            print_json(&serde_json::to_string_pretty(&auth)?);
        }
        Command::Verify {
            payload,
            submitted,
            oracle,
            height,
        } => {
            let auth = commands::read_payload(&payload)?;
            let oracle = match oracle {
                Some(address) => address,
                None => expected_oracle_address(&config)?,
            };
            let current = match height {
                Some(height) => BlockHeight::new(height),
                None => height_source(&config)?.current_block_height().await?,
            };
            commands::verify(&auth, oracle, &submitted, current, config.freshness_window())?;
            print_json(&serde_json::json!({ "accepted": true }).to_string());
        }
        Command::Address => {
            let address = expected_oracle_address(&config)?;
            print_json(&serde_json::json!({ "oracle": address }).to_string());
        }
    }
    Ok(())
}

/// Builds the RPC-backed chain height source from `rpc_url`.
fn height_source(
    config: &OracleConfig,
) -> Result<ProviderHeightSource<impl alloy_provider::Provider>, OracleError> {
    let rpc_url = config
        .rpc_url
        .parse::<Url>()
        .map_err(|e| OracleError::InvalidRpcUrl {
            url: config.rpc_url.clone(),
            reason: e.to_string(),
        })?;
    let provider = ProviderBuilder::new().connect_http(rpc_url);
    Ok(ProviderHeightSource::new(provider))
}

#[allow(clippy::print_stdout)]
fn print_json(json: &str) {
    println!("{json}");
}
