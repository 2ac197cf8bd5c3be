//! The work behind each subcommand, independent of argument parsing and RPC setup.

use std::io::Read;
use std::path::Path;

use alloy_primitives::Address;
use korro_auth::{
    BlockHeight, ChainHeightSource, DecimalAmount, ExchangeRate, FixedPointAmount, FreshnessWindow,
    KeyCustody, Oracle, PurchaseAuthorization,
};

use crate::error::OracleError;

/// Fiat inputs of a quote, as typed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    /// Purchase price.
    pub price: String,
    /// VAT.
    pub vat: String,
    /// Exchange rate, fiat per whole chain unit.
    pub rate: String,
    /// Currency code of `price` and `vat`.
    pub currency: String,
}

/// Parses the request and asks `oracle` for a signed authorization.
///
/// # Errors
///
/// Returns an error if an amount does not parse or the oracle fails.
pub async fn quote<C, K>(
    oracle: &Oracle<C, K>,
    request: &QuoteRequest,
) -> Result<PurchaseAuthorization, OracleError>
where
    C: ChainHeightSource,
    K: KeyCustody,
{
    let price = DecimalAmount::parse(&request.price, request.currency.as_str())?;
    let vat = DecimalAmount::parse(&request.vat, request.currency.as_str())?;
    let rate = ExchangeRate::parse(&request.rate)?;
    let auth = oracle.quote(&price, &vat, &rate).await?;
    tracing::info!(
        oracle = %oracle.address(),
        entry_point = auth.variant().entry_point(),
        total = %auth.total()?.to_decimal_string(),
        "Quoted {price} + {vat} at {rate}"
    );
    Ok(auth)
}

/// Reads a JSON authorization from `path`, or from stdin when `path` is `-`.
///
/// # Errors
///
/// Returns an error if the input cannot be read or is not a valid authorization.
pub fn read_payload(path: &Path) -> Result<PurchaseAuthorization, OracleError> {
    let json = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    parse_payload(&json)
}

/// Parses a JSON authorization.
///
/// # Errors
///
/// Returns [`OracleError::PayloadParse`] on malformed JSON or fields.
pub fn parse_payload(json: &str) -> Result<PurchaseAuthorization, OracleError> {
    Ok(serde_json::from_str(json)?)
}

/// Runs the purchase checks against `auth` at a known chain height.
///
/// # Errors
///
/// Returns the first failed check.
pub fn verify(
    auth: &PurchaseAuthorization,
    oracle: Address,
    submitted: &str,
    current: BlockHeight,
    window: FreshnessWindow,
) -> Result<(), OracleError> {
    let submitted: FixedPointAmount = submitted.parse()?;
    auth.accept(oracle, submitted, current, window)?;
    tracing::info!(
        %oracle,
        block_height = %auth.message().block_height,
        %current,
        "Authorization accepted"
    );
    Ok(())
}
