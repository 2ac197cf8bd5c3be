#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Signed, block-bound price authorizations for EVM purchases.
//!
//! A price oracle converts a fiat price and VAT into the chain's smallest unit,
//! binds both to the current block height, and signs the result with a
//! secp256k1 key. A buyer submits the authorization with the purchase; the
//! contract (or any off-chain verifier) recovers the signer and accepts the
//! purchase only if it is the oracle, the block binding is fresh and the
//! attached value covers price plus VAT.
//!
//! Signer and verifiers have to agree bit-for-bit on three things, each owned
//! by one module:
//!
//! - [`amount`] - decimal to fixed-point conversion (truncating at 18 digits)
//! - [`message`] - the exact bytes that are hashed
//! - [`message::HashVariant`] - raw Keccak-256 or the personal-message prefix
//!
//! # Modules
//!
//! - [`signature`] - private keys, `(r, s, v)` triples and signing
//! - [`verifier`] - address recovery and comparison, per hash variant
//! - [`authorization`] - the signed quote, its wire form and the payment check
//! - [`freshness`] - block-height window policy
//! - [`chain`] - collaborator traits for chain height and key custody
//! - [`oracle`] - the quoting service tying everything together
//! - [`error`] - the shared error type
//!
//! # Feature Flags
//!
//! - `provider` - chain height from an alloy `Provider`
//! - `telemetry` - tracing instrumentation
//!
//! # Example
//!
//! ```rust
//! use korro_auth::amount::{DecimalAmount, ExchangeRate, to_fixed_point};
//! use korro_auth::message::{AuthorizationMessage, BlockHeight, HashVariant};
//! use korro_auth::signature::{PrivateKey, sign};
//! use korro_auth::verifier::Verifier;
//!
//! # fn main() -> Result<(), korro_auth::AuthorizationError> {
//! let rate = ExchangeRate::parse("450")?;
//! let price = to_fixed_point(&DecimalAmount::parse("0.5", "USD")?, &rate)?;
//! let vat = to_fixed_point(&DecimalAmount::parse("10", "USD")?, &rate)?;
//! let message = AuthorizationMessage::new(price, vat, BlockHeight::new(1000));
//!
//! let key: PrivateKey = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".parse()?;
//! let signature = sign(&message.hash(HashVariant::Raw), &key)?;
//!
//! assert!(Verifier::new(HashVariant::Raw).verify_message(&message, &signature, key.address()));
//! assert!(!Verifier::new(HashVariant::PersonalMessagePrefixed).verify_message(&message, &signature, key.address()));
//! # Ok(())
//! # }
//! ```

pub mod amount;
pub mod authorization;
pub mod chain;
pub mod error;
pub mod freshness;
pub mod message;
pub mod oracle;
pub mod signature;
pub mod verifier;

pub use amount::{DecimalAmount, ExchangeRate, FixedPointAmount, to_fixed_point};
pub use authorization::{AuthorizationPayload, PurchaseAuthorization};
pub use chain::{ChainHeightSource, KeyCustody};
pub use error::AuthorizationError;
pub use freshness::FreshnessWindow;
pub use message::{AuthorizationMessage, BlockHeight, HashVariant};
pub use oracle::Oracle;
pub use signature::{PrivateKey, SignatureTriple, sign};
pub use verifier::{Verifier, recover, verify};
