//! Key custody backed by a key resolved from configuration.

use alloy_primitives::Address;
use korro_auth::{AuthorizationError, KeyCustody, PrivateKey};

use crate::config::OracleConfig;
use crate::error::OracleError;

/// Holds one static oracle key in memory for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct LocalKeyCustody {
    key: PrivateKey,
}

impl LocalKeyCustody {
    /// Wraps an already-parsed key.
    #[must_use]
    pub const fn new(key: PrivateKey) -> Self {
        Self { key }
    }

    /// Builds custody from the configured `signer_private_key`.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::MissingSigningKey`] if the key is absent or its
    /// `$VAR` reference did not resolve, and an authorization error if the
    /// key is malformed.
    pub fn from_config(config: &OracleConfig) -> Result<Self, OracleError> {
        let raw = config
            .resolved_signer_key()
            .ok_or(OracleError::MissingSigningKey)?;
        let key: PrivateKey = raw.parse()?;
        Ok(Self::new(key))
    }
}

impl KeyCustody for LocalKeyCustody {
    fn signing_key(&self) -> Result<PrivateKey, AuthorizationError> {
        Ok(self.key.clone())
    }

    fn oracle_address(&self) -> Address {
        self.key.address()
    }
}

/// Determines the address authorizations must recover to: the configured
/// `oracle_address`, else the address of the configured signing key.
///
/// # Errors
///
/// Returns [`OracleError::MissingOracleAddress`] if neither is configured.
pub fn expected_oracle_address(config: &OracleConfig) -> Result<Address, OracleError> {
    if let Some(address) = config.oracle_address {
        return Ok(address);
    }
    match LocalKeyCustody::from_config(config) {
        Ok(custody) => Ok(custody.oracle_address()),
        Err(OracleError::MissingSigningKey) => Err(OracleError::MissingOracleAddress),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn config_with_key(key: Option<&str>) -> OracleConfig {
        OracleConfig {
            signer_private_key: key.map(str::to_owned),
            ..OracleConfig::default()
        }
    }

    #[test]
    fn test_custody_from_config() {
        let custody = LocalKeyCustody::from_config(&config_with_key(Some(KEY))).unwrap();
        assert_eq!(
            custody.oracle_address(),
            address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        assert_eq!(custody.signing_key().unwrap().address(), custody.oracle_address());
    }

    #[test]
    fn test_missing_and_malformed_keys() {
        assert!(matches!(
            LocalKeyCustody::from_config(&config_with_key(None)),
            Err(OracleError::MissingSigningKey)
        ));
        assert!(matches!(
            LocalKeyCustody::from_config(&config_with_key(Some("$ORACLE_KEY"))),
            Err(OracleError::MissingSigningKey)
        ));
        assert!(matches!(
            LocalKeyCustody::from_config(&config_with_key(Some("0x1234"))),
            Err(OracleError::Authorization(AuthorizationError::SigningError(_)))
        ));
    }

    #[test]
    fn test_expected_oracle_address() {
        let explicit = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
        let config = OracleConfig {
            oracle_address: Some(explicit),
            ..config_with_key(Some(KEY))
        };
        assert_eq!(expected_oracle_address(&config).unwrap(), explicit);
        assert_eq!(
            expected_oracle_address(&config_with_key(Some(KEY))).unwrap(),
            address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        assert!(matches!(
            expected_oracle_address(&config_with_key(None)),
            Err(OracleError::MissingOracleAddress)
        ));
    }
}
