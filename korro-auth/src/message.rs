//! The block-bound authorization message and its two hash conventions.
//!
//! The byte sequence that gets hashed is the decimal price, the decimal VAT and
//! the decimal block height written back to back, with no separator:
//!
//! ```text
//! priceUnits ++ vatUnits ++ blockHeight
//! "1111111111111111" ++ "22222222222222222" ++ "1000"
//! ```
//!
//! This matches what the purchase contract rebuilds from its string arguments,
//! so it must not change.

use std::fmt::{Display, Formatter};

use alloy_primitives::{B256, eip191_hash_message, keccak256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::amount::FixedPointAmount;

/// A chain height captured when the authorization was created.
///
/// Acts as a replay nonce: verifiers reject authorizations whose height falls
/// outside a recent window (see [`FreshnessWindow`](crate::freshness::FreshnessWindow)).
///
/// Serialized as a stringified integer, like every other numeric field on the
/// wire.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct BlockHeight(u64);

impl Serialize for BlockHeight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for BlockHeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(serde::de::Error::custom(
                "block height must be a non-negative decimal integer",
            ));
        }
        let height = s
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom("block height does not fit into 64 bits"))?;
        Ok(Self(height))
    }
}

impl Display for BlockHeight {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BlockHeight {
    fn from(height: u64) -> Self {
        Self(height)
    }
}

impl BlockHeight {
    /// Creates a new [`BlockHeight`].
    #[must_use]
    pub const fn new(height: u64) -> Self {
        Self(height)
    }

    /// Returns the raw block number.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Which hashing convention a signature was produced over.
///
/// The purchase contract exposes one verification entry point per convention,
/// and each rejects signatures made under the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HashVariant {
    /// `keccak256(message)`.
    Raw,
    /// `keccak256("\x19Ethereum Signed Message:\n32" ++ keccak256(message))`,
    /// what wallets produce for `personal_sign` over the raw hash.
    #[default]
    PersonalMessagePrefixed,
}

impl HashVariant {
    /// Name of the contract function that verifies this convention.
    #[must_use]
    pub const fn entry_point(self) -> &'static str {
        match self {
            Self::Raw => "verify__noprefix_working",
            Self::PersonalMessagePrefixed => "verify_working",
        }
    }

    /// The other convention.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Raw => Self::PersonalMessagePrefixed,
            Self::PersonalMessagePrefixed => Self::Raw,
        }
    }
}

impl Display for HashVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw => f.write_str("raw"),
            Self::PersonalMessagePrefixed => f.write_str("personalMessagePrefixed"),
        }
    }
}

/// `(priceUnits, vatUnits, blockHeight)`, the canonical input to hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthorizationMessage {
    /// Purchase price in smallest units.
    pub price_units: FixedPointAmount,
    /// VAT in smallest units.
    pub vat_units: FixedPointAmount,
    /// Chain height the quote is bound to.
    pub block_height: BlockHeight,
}

impl AuthorizationMessage {
    /// Creates a new message.
    #[must_use]
    pub const fn new(
        price_units: FixedPointAmount,
        vat_units: FixedPointAmount,
        block_height: BlockHeight,
    ) -> Self {
        Self {
            price_units,
            vat_units,
            block_height,
        }
    }

    /// The exact bytes that are hashed: three decimal strings concatenated.
    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        format!("{}{}{}", self.price_units, self.vat_units, self.block_height).into_bytes()
    }

    /// Hashes the message under the given convention.
    #[must_use]
    pub fn hash(&self, variant: HashVariant) -> B256 {
        let raw = keccak256(self.canonical_bytes());
        match variant {
            HashVariant::Raw => raw,
            HashVariant::PersonalMessagePrefixed => eip191_hash_message(raw),
        }
    }
}
