//! Error types for price authorization.
//!
//! Every failure in this crate is a local, recoverable condition reported as an
//! [`AuthorizationError`]. Nothing here retries: a mismatch or a stale binding
//! is a final answer, and the caller decides whether to re-quote.

use alloy_primitives::Address;

use crate::amount::FixedPointAmount;
use crate::message::BlockHeight;

/// Errors produced while converting, signing, or verifying an authorization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    /// A price, VAT amount, or exchange rate was not strictly positive, or did
    /// not parse as a decimal number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A conversion needed more digits than the decimal type can hold.
    #[error("precision overflow: {0}")]
    PrecisionOverflow(String),

    /// `price + vat` does not fit into 256 bits.
    #[error("arithmetic overflow while summing price and VAT")]
    ArithmeticOverflow,

    /// The private key material is malformed.
    #[error("signing error: {0}")]
    SigningError(String),

    /// The signature recovered to a different address than expected.
    #[error("signature recovered {recovered}, expected {expected}")]
    VerificationMismatch {
        /// Address the verifier was told to expect.
        expected: Address,
        /// Address actually recovered from the signature.
        recovered: Address,
    },

    /// The `(r, s, v)` triple cannot form a recoverable signature.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// The authorization is bound to a block older than the freshness window.
    #[error("authorization bound to block {bound} is stale at block {current} (max age {max_age})")]
    StaleAuthorization {
        /// Height the authorization was bound to.
        bound: BlockHeight,
        /// Current chain height.
        current: BlockHeight,
        /// Maximum accepted age in blocks.
        max_age: u64,
    },

    /// The authorization is bound to a block the chain has not reached yet.
    #[error("authorization bound to future block {bound} (current {current})")]
    FutureBlock {
        /// Height the authorization was bound to.
        bound: BlockHeight,
        /// Current chain height.
        current: BlockHeight,
    },

    /// The submitted value does not cover `price + vat`.
    #[error("insufficient payment: required {required}, submitted {submitted}")]
    InsufficientPayment {
        /// `price + vat` in smallest units.
        required: FixedPointAmount,
        /// Value attached to the purchase.
        submitted: FixedPointAmount,
    },

    /// The chain height collaborator failed.
    #[error("chain height unavailable: {0}")]
    ChainHeight(String),
}
