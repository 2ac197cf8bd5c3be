//! Signer recovery and address checks.
//!
//! The purchase contract has two verification entry points, one per
//! [`HashVariant`]. [`Verifier`] models both: it hashes the message under its
//! configured variant before recovering, so a signature made under the other
//! convention recovers to an unrelated address and is rejected.

#[cfg(feature = "telemetry")]
use tracing::instrument;

use alloy_primitives::{Address, B256};

use crate::error::AuthorizationError;
use crate::message::{AuthorizationMessage, HashVariant};
use crate::signature::SignatureTriple;

/// Recovers the address that signed `hash`.
///
/// # Errors
///
/// Returns [`AuthorizationError::MalformedSignature`] if no public key can be
/// recovered from `(hash, signature)`.
pub fn recover(hash: &B256, signature: &SignatureTriple) -> Result<Address, AuthorizationError> {
    signature
        .to_signature()
        .recover_address_from_prehash(hash)
        .map_err(|e| AuthorizationError::MalformedSignature(e.to_string()))
}

/// Returns `true` iff `signature` over `hash` recovers to exactly `expected`.
///
/// A signature that cannot be recovered at all is simply not a match.
#[must_use]
pub fn verify(hash: &B256, signature: &SignatureTriple, expected: Address) -> bool {
    recover(hash, signature).is_ok_and(|recovered| recovered == expected)
}

/// Verifies authorizations under one hashing convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verifier {
    variant: HashVariant,
}

impl Verifier {
    /// Creates a verifier for the given convention.
    #[must_use]
    pub const fn new(variant: HashVariant) -> Self {
        Self { variant }
    }

    /// The convention this verifier hashes with.
    #[must_use]
    pub const fn variant(&self) -> HashVariant {
        self.variant
    }

    /// Hashes `message` under this verifier's convention.
    #[must_use]
    pub fn hash(&self, message: &AuthorizationMessage) -> B256 {
        message.hash(self.variant)
    }

    /// Recovers the signer of `message`.
    ///
    /// # Errors
    ///
    /// See [`recover`].
    pub fn recover_message(
        &self,
        message: &AuthorizationMessage,
        signature: &SignatureTriple,
    ) -> Result<Address, AuthorizationError> {
        recover(&self.hash(message), signature)
    }

    /// Returns `true` iff `message` was signed by `expected`.
    #[must_use]
    pub fn verify_message(
        &self,
        message: &AuthorizationMessage,
        signature: &SignatureTriple,
        expected: Address,
    ) -> bool {
        verify(&self.hash(message), signature, expected)
    }

    /// Like [`verify_message`](Self::verify_message), but explains a rejection.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::VerificationMismatch`] when the signature
    /// recovers to another address, or
    /// [`AuthorizationError::MalformedSignature`] when it cannot be recovered.
    #[cfg_attr(feature = "telemetry", instrument(skip_all, err, fields(variant = %self.variant, expected = %expected)))]
    pub fn ensure_signed_by(
        &self,
        message: &AuthorizationMessage,
        signature: &SignatureTriple,
        expected: Address,
    ) -> Result<Address, AuthorizationError> {
        let recovered = self.recover_message(message, signature)?;
        if recovered != expected {
            return Err(AuthorizationError::VerificationMismatch {
                expected,
                recovered,
            });
        }
        Ok(recovered)
    }
}
