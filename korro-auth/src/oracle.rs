//! The quoting side: turn a fiat price into a signed, block-bound authorization.

#[cfg(feature = "telemetry")]
use tracing::instrument;

use alloy_primitives::Address;

use crate::amount::{DecimalAmount, ExchangeRate, to_fixed_point};
use crate::authorization::PurchaseAuthorization;
use crate::chain::{ChainHeightSource, KeyCustody};
use crate::error::AuthorizationError;
use crate::message::{AuthorizationMessage, HashVariant};
use crate::signature::sign;

/// A price oracle wired to its chain and key collaborators.
///
/// # Example
///
/// ```rust,ignore
/// let oracle = Oracle::new(chain, custody, HashVariant::PersonalMessagePrefixed);
/// let price = DecimalAmount::parse("0.5", "USD")?;
/// let vat = DecimalAmount::parse("10", "USD")?;
/// let auth = oracle.quote(&price, &vat, &ExchangeRate::parse("450")?).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Oracle<C, K> {
    chain: C,
    custody: K,
    variant: HashVariant,
}

impl<C, K> Oracle<C, K> {
    /// Creates an oracle that signs under `variant`.
    #[must_use]
    pub const fn new(chain: C, custody: K, variant: HashVariant) -> Self {
        Self {
            chain,
            custody,
            variant,
        }
    }

    /// The convention this oracle signs under.
    #[must_use]
    pub const fn variant(&self) -> HashVariant {
        self.variant
    }
}

impl<C: ChainHeightSource, K: KeyCustody> Oracle<C, K> {
    /// The address authorizations from this oracle recover to.
    #[must_use]
    pub fn address(&self) -> Address {
        self.custody.oracle_address()
    }

    /// Quotes `price` and `vat` at `rate`, bound to the current chain height.
    ///
    /// The chain is queried exactly once per quote.
    ///
    /// # Errors
    ///
    /// Propagates conversion errors, [`AuthorizationError::ChainHeight`] from
    /// the chain source and [`AuthorizationError::SigningError`] from custody.
    #[cfg_attr(feature = "telemetry", instrument(skip_all, err, fields(price = %price, vat = %vat, rate = %rate)))]
    pub async fn quote(
        &self,
        price: &DecimalAmount,
        vat: &DecimalAmount,
        rate: &ExchangeRate,
    ) -> Result<PurchaseAuthorization, AuthorizationError> {
        if price.currency() != vat.currency() {
            return Err(AuthorizationError::InvalidAmount(format!(
                "price is in {} but VAT is in {}",
                price.currency(),
                vat.currency()
            )));
        }
        let price_units = to_fixed_point(price, rate)?;
        let vat_units = to_fixed_point(vat, rate)?;
        let block_height = self.chain.current_block_height().await?;

        let message = AuthorizationMessage::new(price_units, vat_units, block_height);
        let key = self.custody.signing_key()?;
        let signature = sign(&message.hash(self.variant), &key)?;

        #[cfg(feature = "telemetry")]
        tracing::info!(
            price_units = %price_units,
            vat_units = %vat_units,
            block_height = %block_height,
            variant = %self.variant,
            "Signed purchase authorization"
        );

        Ok(PurchaseAuthorization::new(message, signature, self.variant))
    }
}
