//! Block-height freshness policy.

use serde::{Deserialize, Serialize};

use crate::error::AuthorizationError;
use crate::message::BlockHeight;

/// Default window: the 256 blocks for which the EVM still exposes `blockhash`.
pub const DEFAULT_MAX_AGE_BLOCKS: u64 = 256;

/// Accepts authorizations bound to one of the last `max_age_blocks` blocks.
///
/// An authorization bound to height `h` is fresh at chain height `c` iff
/// `h <= c` and `c - h <= max_age_blocks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshnessWindow {
    /// Maximum number of blocks an authorization may lag the chain head.
    pub max_age_blocks: u64,
}

impl Default for FreshnessWindow {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE_BLOCKS)
    }
}

impl FreshnessWindow {
    /// Creates a window of `max_age_blocks` blocks.
    #[must_use]
    pub const fn new(max_age_blocks: u64) -> Self {
        Self { max_age_blocks }
    }

    /// Checks `bound` against the current chain height.
    ///
    /// # Errors
    ///
    /// - [`AuthorizationError::FutureBlock`] if `bound` is above `current`.
    /// - [`AuthorizationError::StaleAuthorization`] if `bound` is older than
    ///   the window allows.
    pub fn check(self, bound: BlockHeight, current: BlockHeight) -> Result<(), AuthorizationError> {
        let Some(age) = current.as_u64().checked_sub(bound.as_u64()) else {
            return Err(AuthorizationError::FutureBlock { bound, current });
        };
        if age > self.max_age_blocks {
            return Err(AuthorizationError::StaleAuthorization {
                bound,
                current,
                max_age: self.max_age_blocks,
            });
        }
        Ok(())
    }
}
