//! Recoverable secp256k1 signatures over authorization hashes.
//!
//! [`sign`] produces a low-s ECDSA signature with a recovery id, so a verifier
//! can reconstruct the signer's address from `(hash, r, s, v)` alone.

use std::fmt::{Debug, Formatter};
use std::str::FromStr;

use alloy_primitives::{Address, B256, Signature, U256, hex};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

use crate::error::AuthorizationError;

/// A secp256k1 signing key handed over by key custody.
///
/// Validated on construction. The key bytes never appear in `Debug` output.
#[derive(Clone)]
pub struct PrivateKey {
    signer: PrivateKeySigner,
}

impl PrivateKey {
    /// Builds a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::SigningError`] if `bytes` is not exactly
    /// 32 bytes long or is not a valid secp256k1 scalar (zero, or not below
    /// the curve order).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AuthorizationError> {
        if bytes.len() != 32 {
            return Err(AuthorizationError::SigningError(format!(
                "private key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let signer = PrivateKeySigner::from_slice(bytes)
            .map_err(|_| AuthorizationError::SigningError("invalid secp256k1 scalar".into()))?;
        Ok(Self { signer })
    }

    /// The address controlled by this key.
    #[must_use]
    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

impl FromStr for PrivateKey {
    type Err = AuthorizationError;

    /// Parses a hex key, with or without `0x`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| AuthorizationError::SigningError(format!("private key is not hex: {e}")))?;
        Self::from_slice(&bytes)
    }
}

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// `(r, s, v)` as consumed by `ecrecover`.
///
/// Accepts `v` in either the `{27, 28}` or the `{0, 1}` convention and always
/// reports it as `27`/`28`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureTriple {
    r: B256,
    s: B256,
    y_parity: bool,
}

impl SignatureTriple {
    /// Builds a triple from its wire components.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::MalformedSignature`] if `v` is not one of
    /// `0`, `1`, `27` or `28`.
    pub fn new(r: B256, s: B256, v: u64) -> Result<Self, AuthorizationError> {
        let y_parity = match v {
            0 | 27 => false,
            1 | 28 => true,
            other => {
                return Err(AuthorizationError::MalformedSignature(format!(
                    "recovery id {other} is not one of 0, 1, 27, 28"
                )));
            }
        };
        Ok(Self { r, s, y_parity })
    }

    /// The `r` scalar.
    #[must_use]
    pub const fn r(&self) -> B256 {
        self.r
    }

    /// The `s` scalar.
    #[must_use]
    pub const fn s(&self) -> B256 {
        self.s
    }

    /// The recovery id in the `27`/`28` convention.
    #[must_use]
    pub const fn v(&self) -> u8 {
        if self.y_parity { 28 } else { 27 }
    }

    /// The recovery id in the `0`/`1` convention.
    #[must_use]
    pub const fn y_parity(&self) -> bool {
        self.y_parity
    }

    /// Converts into alloy's signature type for recovery.
    #[must_use]
    pub fn to_signature(&self) -> Signature {
        Signature::new(
            U256::from_be_bytes(self.r.0),
            U256::from_be_bytes(self.s.0),
            self.y_parity,
        )
    }
}

impl From<Signature> for SignatureTriple {
    fn from(signature: Signature) -> Self {
        Self {
            r: B256::from(signature.r().to_be_bytes::<32>()),
            s: B256::from(signature.s().to_be_bytes::<32>()),
            y_parity: signature.v(),
        }
    }
}

/// Signs a 32-byte hash.
///
/// The result is low-s normalized.
///
/// # Errors
///
/// Returns [`AuthorizationError::SigningError`] if the underlying signer
/// fails. Every 32-byte hash is signable, so in practice this only surfaces
/// key problems.
pub fn sign(hash: &B256, key: &PrivateKey) -> Result<SignatureTriple, AuthorizationError> {
    let signature = key
        .signer
        .sign_hash_sync(hash)
        .map_err(|e| AuthorizationError::SigningError(format!("{e}")))?;
    Ok(signature.normalized_s().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_key_address() {
        let key: PrivateKey = KEY.parse().unwrap();
        assert_eq!(
            key.address(),
            address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn test_key_without_prefix() {
        let key: PrivateKey = KEY.trim_start_matches("0x").parse().unwrap();
        assert_eq!(
            key.address(),
            address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn test_malformed_keys() {
        assert!(matches!(
            PrivateKey::from_slice(&[1u8; 31]),
            Err(AuthorizationError::SigningError(_))
        ));
        assert!(matches!(
            PrivateKey::from_slice(&[0u8; 32]),
            Err(AuthorizationError::SigningError(_))
        ));
        assert!(matches!(
            PrivateKey::from_slice(&[0xffu8; 32]),
            Err(AuthorizationError::SigningError(_))
        ));
        assert!(matches!(
            "0xnothex".parse::<PrivateKey>(),
            Err(AuthorizationError::SigningError(_))
        ));
    }

    #[test]
    fn test_debug_hides_key_material() {
        let key: PrivateKey = KEY.parse().unwrap();
        let rendered = format!("{key:?}");
        assert!(!rendered.contains("ac0974bec39a17e3"));
        assert!(rendered.contains("PrivateKey"));
    }

    #[test]
    fn test_signature_is_low_s() {
        let key: PrivateKey = KEY.parse().unwrap();
        let half_order = U256::from_be_bytes(
            b256!("0x7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0").0,
        );
        for byte in 0u8..16 {
            let sig = sign(&B256::repeat_byte(byte), &key).unwrap();
            assert!(U256::from_be_bytes(sig.s().0) <= half_order);
            assert!(sig.v() == 27 || sig.v() == 28);
        }
    }

    #[test]
    fn test_signing_is_deterministic() {
        let key: PrivateKey = KEY.parse().unwrap();
        let hash = B256::repeat_byte(0x42);
        assert_eq!(sign(&hash, &key).unwrap(), sign(&hash, &key).unwrap());
    }

    #[test]
    fn test_recovery_id_conventions() {
        let r = B256::repeat_byte(1);
        let s = B256::repeat_byte(2);
        assert_eq!(SignatureTriple::new(r, s, 0).unwrap(), SignatureTriple::new(r, s, 27).unwrap());
        assert_eq!(SignatureTriple::new(r, s, 1).unwrap(), SignatureTriple::new(r, s, 28).unwrap());
        assert_eq!(SignatureTriple::new(r, s, 1).unwrap().v(), 28);
        assert!(matches!(
            SignatureTriple::new(r, s, 29),
            Err(AuthorizationError::MalformedSignature(_))
        ));
    }

    #[test]
    fn test_alloy_signature_roundtrip() {
        let key: PrivateKey = KEY.parse().unwrap();
        let triple = sign(&B256::repeat_byte(7), &key).unwrap();
        assert_eq!(SignatureTriple::from(triple.to_signature()), triple);
    }
}
