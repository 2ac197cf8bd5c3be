//! Collaborators the oracle depends on but does not own.
//!
//! - [`ChainHeightSource`] answers "what block is the chain at now?"
//! - [`KeyCustody`] hands out the oracle's signing key and address.
//!
//! Both are passed explicitly to whatever needs them; there is no shared
//! provider or wallet handle.

use std::future::Future;
use std::sync::Arc;

use alloy_primitives::Address;

use crate::error::AuthorizationError;
use crate::message::BlockHeight;
use crate::signature::PrivateKey;

/// Source of the current chain height.
pub trait ChainHeightSource: Send + Sync {
    /// Returns the latest block number.
    fn current_block_height(
        &self,
    ) -> impl Future<Output = Result<BlockHeight, AuthorizationError>> + Send;
}

impl<T: ChainHeightSource> ChainHeightSource for Arc<T> {
    async fn current_block_height(&self) -> Result<BlockHeight, AuthorizationError> {
        (**self).current_block_height().await
    }
}

/// Custody of the oracle's signing key.
///
/// Implementations decide whether the oracle uses one static key or rotates
/// keys; the core only reads the key for the duration of a signature.
pub trait KeyCustody: Send + Sync {
    /// Returns the key to sign the next authorization with.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::SigningError`] if no usable key is
    /// available.
    fn signing_key(&self) -> Result<PrivateKey, AuthorizationError>;

    /// The address verifiers should expect authorizations to recover to.
    fn oracle_address(&self) -> Address;
}

impl<T: KeyCustody> KeyCustody for Arc<T> {
    fn signing_key(&self) -> Result<PrivateKey, AuthorizationError> {
        (**self).signing_key()
    }

    fn oracle_address(&self) -> Address {
        (**self).oracle_address()
    }
}

#[cfg(feature = "provider")]
pub use rpc::ProviderHeightSource;

#[cfg(feature = "provider")]
mod rpc {
    use alloy_provider::Provider;
    #[cfg(feature = "telemetry")]
    use tracing::instrument;

    use super::ChainHeightSource;
    use crate::error::AuthorizationError;
    use crate::message::BlockHeight;

    /// Reads the chain height from any alloy [`Provider`] via `eth_blockNumber`.
    #[derive(Debug, Clone)]
    pub struct ProviderHeightSource<P> {
        provider: P,
    }

    impl<P> ProviderHeightSource<P> {
        /// Wraps an alloy provider.
        #[must_use]
        pub const fn new(provider: P) -> Self {
            Self { provider }
        }

        /// The wrapped provider.
        #[must_use]
        pub const fn inner(&self) -> &P {
            &self.provider
        }
    }

    impl<P: Provider + Send + Sync> ChainHeightSource for ProviderHeightSource<P> {
        #[cfg_attr(feature = "telemetry", instrument(skip_all, err))]
        async fn current_block_height(&self) -> Result<BlockHeight, AuthorizationError> {
            let number = self
                .provider
                .get_block_number()
                .await
                .map_err(|e: alloy_transport::TransportError| {
                    AuthorizationError::ChainHeight(e.to_string())
                })?;
            Ok(BlockHeight::new(number))
        }
    }

}
