//! The signed purchase authorization handed from the oracle to a buyer.
//!
//! A [`PurchaseAuthorization`] carries everything the purchase contract needs:
//! the block-bound message, the signature and the hashing convention it was
//! signed under. It holds no validity state of its own; [`accept`] re-derives
//! validity from the oracle address, the current chain height and the value
//! attached to the purchase.
//!
//! [`accept`]: PurchaseAuthorization::accept
//!
//! # Wire format
//!
//! ```json
//! {
//!   "priceUnits": "1111111111111111",
//!   "vatUnits": "22222222222222222",
//!   "blockHeight": "1000",
//!   "v": 28,
//!   "r": "0x…",
//!   "s": "0x…",
//!   "variant": "personalMessagePrefixed"
//! }
//! ```

use alloy_primitives::{Address, B256, hex};
use serde::{Deserialize, Serialize};

use crate::amount::FixedPointAmount;
use crate::error::AuthorizationError;
use crate::freshness::FreshnessWindow;
use crate::message::{AuthorizationMessage, BlockHeight, HashVariant};
use crate::signature::SignatureTriple;
use crate::verifier::Verifier;

/// A quote signed by the price oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "AuthorizationPayload", try_from = "AuthorizationPayload")]
pub struct PurchaseAuthorization {
    message: AuthorizationMessage,
    signature: SignatureTriple,
    variant: HashVariant,
}

impl PurchaseAuthorization {
    /// Bundles a message with the signature made over `message.hash(variant)`.
    #[must_use]
    pub const fn new(
        message: AuthorizationMessage,
        signature: SignatureTriple,
        variant: HashVariant,
    ) -> Self {
        Self {
            message,
            signature,
            variant,
        }
    }

    /// The signed message.
    #[must_use]
    pub const fn message(&self) -> &AuthorizationMessage {
        &self.message
    }

    /// The oracle's signature.
    #[must_use]
    pub const fn signature(&self) -> &SignatureTriple {
        &self.signature
    }

    /// The convention the message was hashed under.
    #[must_use]
    pub const fn variant(&self) -> HashVariant {
        self.variant
    }

    /// `price + vat`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::ArithmeticOverflow`] rather than wrapping.
    pub fn total(&self) -> Result<FixedPointAmount, AuthorizationError> {
        self.message.price_units.checked_add(self.message.vat_units)
    }

    /// Whether `submitted` covers `price + vat`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::ArithmeticOverflow`] if the sum overflows.
    pub fn is_sufficient(&self, submitted: FixedPointAmount) -> Result<bool, AuthorizationError> {
        Ok(submitted >= self.total()?)
    }

    /// Whether the authorization was signed by `oracle`.
    #[must_use]
    pub fn verify(&self, oracle: Address) -> bool {
        Verifier::new(self.variant).verify_message(&self.message, &self.signature, oracle)
    }

    /// Runs the checks the purchase contract performs before taking payment.
    ///
    /// In order: the signature must recover to `oracle`, the block binding must
    /// be inside `window` at height `current`, and `submitted` must cover
    /// `price + vat`.
    ///
    /// # Errors
    ///
    /// Returns the first failed check as an [`AuthorizationError`].
    pub fn accept(
        &self,
        oracle: Address,
        submitted: FixedPointAmount,
        current: BlockHeight,
        window: FreshnessWindow,
    ) -> Result<(), AuthorizationError> {
        Verifier::new(self.variant).ensure_signed_by(&self.message, &self.signature, oracle)?;
        window.check(self.message.block_height, current)?;
        let required = self.total()?;
        if submitted < required {
            return Err(AuthorizationError::InsufficientPayment {
                required,
                submitted,
            });
        }
        Ok(())
    }

    /// Arguments for the contract's verification and purchase functions, in
    /// call order: `(priceUnits, vatUnits, blockHeight, v, r, s)`.
    #[must_use]
    pub fn call_args(&self) -> [String; 6] {
        [
            self.message.price_units.to_string(),
            self.message.vat_units.to_string(),
            self.message.block_height.to_string(),
            self.signature.v().to_string(),
            hex::encode_prefixed(self.signature.r()),
            hex::encode_prefixed(self.signature.s()),
        ]
    }
}

/// JSON shape of a [`PurchaseAuthorization`].
///
/// Numbers that may exceed 53 bits travel as decimal strings; `v` is a plain
/// integer and `r`/`s` are `0x`-prefixed 32-byte hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationPayload {
    /// Purchase price in smallest units.
    pub price_units: FixedPointAmount,
    /// VAT in smallest units.
    pub vat_units: FixedPointAmount,
    /// Chain height the quote is bound to.
    pub block_height: BlockHeight,
    /// Recovery id, `27` or `28` (`0`/`1` accepted on input).
    pub v: u8,
    /// Signature `r`.
    pub r: B256,
    /// Signature `s`.
    pub s: B256,
    /// Hashing convention used when signing.
    pub variant: HashVariant,
}

impl From<PurchaseAuthorization> for AuthorizationPayload {
    fn from(auth: PurchaseAuthorization) -> Self {
        Self {
            price_units: auth.message.price_units,
            vat_units: auth.message.vat_units,
            block_height: auth.message.block_height,
            v: auth.signature.v(),
            r: auth.signature.r(),
            s: auth.signature.s(),
            variant: auth.variant,
        }
    }
}

impl TryFrom<AuthorizationPayload> for PurchaseAuthorization {
    type Error = AuthorizationError;

    fn try_from(payload: AuthorizationPayload) -> Result<Self, Self::Error> {
        let signature = SignatureTriple::new(payload.r, payload.s, payload.v.into())?;
        let message =
            AuthorizationMessage::new(payload.price_units, payload.vat_units, payload.block_height);
        Ok(Self::new(message, signature, payload.variant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::{DecimalAmount, ExchangeRate, to_fixed_point};
    use crate::signature::{PrivateKey, sign};
    use alloy_primitives::U256;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const OTHER_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    fn signed(message: AuthorizationMessage, variant: HashVariant) -> PurchaseAuthorization {
        let key: PrivateKey = KEY.parse().unwrap();
        let signature = sign(&message.hash(variant), &key).unwrap();
        PurchaseAuthorization::new(message, signature, variant)
    }

    fn quote_message() -> AuthorizationMessage {
        let rate = ExchangeRate::parse("450").unwrap();
        let price = to_fixed_point(&DecimalAmount::parse("0.5", "USD").unwrap(), &rate).unwrap();
        let vat = to_fixed_point(&DecimalAmount::parse("10", "USD").unwrap(), &rate).unwrap();
        AuthorizationMessage::new(price, vat, BlockHeight::new(1000))
    }

    #[test]
    fn test_quote_scenario() {
        let oracle = KEY.parse::<PrivateKey>().unwrap().address();
        let other = OTHER_KEY.parse::<PrivateKey>().unwrap().address();

        for variant in [HashVariant::Raw, HashVariant::PersonalMessagePrefixed] {
            let auth = signed(quote_message(), variant);
            assert!(auth.verify(oracle));
            assert!(!auth.verify(other));

            let mislabeled = PurchaseAuthorization::new(*auth.message(), *auth.signature(), variant.other());
            assert!(!mislabeled.verify(oracle));
        }
    }

    #[test]
    fn test_sufficiency_boundary() {
        let auth = signed(quote_message(), HashVariant::Raw);
        let total = auth.total().unwrap();
        assert_eq!(total, FixedPointAmount::from(23_333_333_333_333_333));
        assert!(auth.is_sufficient(total).unwrap());
        assert!(auth.is_sufficient(FixedPointAmount::from(23_333_333_333_333_334)).unwrap());
        assert!(!auth.is_sufficient(FixedPointAmount::from(23_333_333_333_333_332)).unwrap());
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let message = AuthorizationMessage::new(
            FixedPointAmount::from_units(U256::MAX),
            FixedPointAmount::from(1),
            BlockHeight::new(1),
        );
        let auth = signed(message, HashVariant::Raw);
        assert_eq!(auth.total(), Err(AuthorizationError::ArithmeticOverflow));
        assert_eq!(
            auth.is_sufficient(FixedPointAmount::from_units(U256::MAX)),
            Err(AuthorizationError::ArithmeticOverflow)
        );
    }

    #[test]
    fn test_accept() {
        let oracle = KEY.parse::<PrivateKey>().unwrap().address();
        let auth = signed(quote_message(), HashVariant::PersonalMessagePrefixed);
        let window = FreshnessWindow::new(20);
        let total = auth.total().unwrap();

        assert!(auth.accept(oracle, total, BlockHeight::new(1005), window).is_ok());
        assert!(matches!(
            auth.accept(Address::ZERO, total, BlockHeight::new(1005), window),
            Err(AuthorizationError::VerificationMismatch { .. })
        ));
        assert!(matches!(
            auth.accept(oracle, total, BlockHeight::new(1021), window),
            Err(AuthorizationError::StaleAuthorization { .. })
        ));
        assert!(matches!(
            auth.accept(oracle, total, BlockHeight::new(999), window),
            Err(AuthorizationError::FutureBlock { .. })
        ));
        assert_eq!(
            auth.accept(oracle, FixedPointAmount::from(1), BlockHeight::new(1005), window),
            Err(AuthorizationError::InsufficientPayment {
                required: total,
                submitted: FixedPointAmount::from(1),
            })
        );
    }

    #[test]
    fn test_call_args() {
        let auth = signed(quote_message(), HashVariant::Raw);
        let args = auth.call_args();
        assert_eq!(args[0], "1111111111111111");
        assert_eq!(args[1], "22222222222222222");
        assert_eq!(args[2], "1000");
        assert!(args[3] == "27" || args[3] == "28");
        assert_eq!(args[4].len(), 66);
        assert!(args[5].starts_with("0x"));
    }

    #[test]
    fn test_json_shape() {
        let auth = signed(quote_message(), HashVariant::PersonalMessagePrefixed);
        let json = serde_json::to_value(auth).unwrap();
        assert_eq!(json["priceUnits"], "1111111111111111");
        assert_eq!(json["vatUnits"], "22222222222222222");
        assert_eq!(json["blockHeight"], "1000");
        assert_eq!(json["variant"], "personalMessagePrefixed");
        assert!(json["v"].is_u64());
        assert_eq!(json["r"].as_str().unwrap().len(), 66);

        let back: PurchaseAuthorization = serde_json::from_value(json).unwrap();
        assert_eq!(back, auth);
    }

    #[test]
    fn test_json_accepts_zero_one_recovery_id() {
        let auth = signed(quote_message(), HashVariant::Raw);
        let mut json = serde_json::to_value(auth).unwrap();
        json["v"] = serde_json::json!(auth.signature().v() - 27);
        let back: PurchaseAuthorization = serde_json::from_value(json).unwrap();
        assert_eq!(back, auth);
    }

    #[test]
    fn test_json_rejects_bad_recovery_id() {
        let auth = signed(quote_message(), HashVariant::Raw);
        let mut json = serde_json::to_value(auth).unwrap();
        json["v"] = serde_json::json!(35);
        assert!(serde_json::from_value::<PurchaseAuthorization>(json).is_err());
    }
}
