//! Fiat amounts and their fixed-point on-chain representation.
//!
//! The oracle quotes prices in a fiat currency (e.g. `"0.50"` EUR) and the
//! contract charges in the chain's smallest unit (18 decimals). This module
//! owns the one conversion between the two, [`to_fixed_point`], and the
//! [`FixedPointAmount`] it produces.
//!
//! # Truncation
//!
//! `amount / rate` is truncated toward zero at the 18th fractional digit, never
//! rounded. The signer and every verifier must derive identical integers from
//! identical inputs, so the division is carried out exactly on integers:
//!
//! ```text
//! units = floor(amount * 10^18 / rate)
//! ```
//!
//! A positive amount that truncates to zero units is an error rather than a
//! free purchase.
//!
//! # Example
//!
//! ```rust
//! use korro_auth::amount::{DecimalAmount, ExchangeRate, to_fixed_point};
//!
//! let price = DecimalAmount::parse("0.5", "USD").unwrap();
//! let rate = ExchangeRate::parse("450").unwrap();
//! let units = to_fixed_point(&price, &rate).unwrap();
//! assert_eq!(units.to_string(), "1111111111111111");
//! ```

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::error::AuthorizationError;

/// Number of fractional digits of the on-chain unit.
pub const DECIMALS: u32 = 18;

/// A non-negative fiat amount (price or VAT) in a named currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalAmount {
    value: Decimal,
    currency: String,
}

impl DecimalAmount {
    /// Wraps an already-parsed decimal.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::InvalidAmount`] if `value` is negative.
    pub fn new(value: Decimal, currency: impl Into<String>) -> Result<Self, AuthorizationError> {
        let currency = currency.into();
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AuthorizationError::InvalidAmount(format!(
                "{value} {currency} is negative"
            )));
        }
        Ok(Self { value, currency })
    }

    /// Parses a decimal string such as `"10.50"`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::InvalidAmount`] for malformed or negative
    /// input and [`AuthorizationError::PrecisionOverflow`] when the string has
    /// more digits than a [`Decimal`] holds exactly.
    pub fn parse(value: &str, currency: impl Into<String>) -> Result<Self, AuthorizationError> {
        Self::new(parse_decimal(value)?, currency)
    }

    /// The decimal value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.value
    }

    /// The currency code this amount is denominated in.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }
}

impl Display for DecimalAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

/// Fiat per one whole unit of the chain currency. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeRate(Decimal);

impl ExchangeRate {
    /// Wraps an already-parsed decimal.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::InvalidAmount`] unless `rate > 0`.
    pub fn new(rate: Decimal) -> Result<Self, AuthorizationError> {
        if rate <= Decimal::ZERO {
            return Err(AuthorizationError::InvalidAmount(format!(
                "exchange rate {rate} is not positive"
            )));
        }
        Ok(Self(rate))
    }

    /// Parses a decimal string such as `"450"`.
    ///
    /// # Errors
    ///
    /// See [`DecimalAmount::parse`]; additionally rejects zero.
    pub fn parse(rate: &str) -> Result<Self, AuthorizationError> {
        Self::new(parse_decimal(rate)?)
    }

    /// The decimal value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl Display for ExchangeRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

fn parse_decimal(input: &str) -> Result<Decimal, AuthorizationError> {
    Decimal::from_str_exact(input.trim()).map_err(|e| match e {
        rust_decimal::Error::Underflow
        | rust_decimal::Error::ExceedsMaximumPossibleValue
        | rust_decimal::Error::LessThanMinimumPossibleValue
        | rust_decimal::Error::ScaleExceedsMaximumPrecision(_) => {
            AuthorizationError::PrecisionOverflow(format!("{input:?}: {e}"))
        }
        _ => AuthorizationError::InvalidAmount(format!("{input:?}: {e}")),
    })
}

/// An amount in the chain's smallest unit (10^-18 of a whole unit).
///
/// Serialized as a decimal string, since JSON numbers cannot carry 256-bit
/// integers without loss:
///
/// ```json
/// "1111111111111111"
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct FixedPointAmount(U256);

impl FixedPointAmount {
    /// Zero units.
    pub const ZERO: Self = Self(U256::ZERO);

    /// Wraps a raw integer amount of smallest units.
    #[must_use]
    pub const fn from_units(units: U256) -> Self {
        Self(units)
    }

    /// The raw integer amount of smallest units.
    #[must_use]
    pub const fn units(self) -> U256 {
        self.0
    }

    /// Adds two amounts, refusing to wrap.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::ArithmeticOverflow`] if the sum exceeds
    /// `U256::MAX`.
    pub fn checked_add(self, rhs: Self) -> Result<Self, AuthorizationError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(AuthorizationError::ArithmeticOverflow)
    }

    /// Formats the amount in whole units, e.g. `"0.001111111111111111"`.
    ///
    /// Trailing fractional zeros are dropped.
    #[must_use]
    pub fn to_decimal_string(self) -> String {
        let digits = self.0.to_string();
        let width = DECIMALS as usize + 1;
        let padded = format!("{digits:0>width$}");
        let (whole, fraction) = padded.split_at(padded.len() - DECIMALS as usize);
        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            whole.to_owned()
        } else {
            format!("{whole}.{fraction}")
        }
    }
}

impl From<u64> for FixedPointAmount {
    fn from(units: u64) -> Self {
        Self(U256::from(units))
    }
}

impl From<FixedPointAmount> for U256 {
    fn from(amount: FixedPointAmount) -> Self {
        amount.0
    }
}

impl Display for FixedPointAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FixedPointAmount {
    type Err = AuthorizationError;

    /// Parses a plain base-10 integer. Hex, signs and separators are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AuthorizationError::InvalidAmount(format!(
                "{s:?} is not a decimal integer"
            )));
        }
        U256::from_str_radix(s, 10)
            .map(Self)
            .map_err(|e| AuthorizationError::InvalidAmount(format!("{s:?}: {e}")))
    }
}

fn pow10(exp: u32) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

fn mantissa(value: Decimal) -> U256 {
    U256::from(value.mantissa().unsigned_abs())
}

/// Converts a fiat amount into smallest on-chain units at the given rate.
///
/// The quotient `amount / rate` is truncated toward zero at [`DECIMALS`]
/// fractional digits.
///
/// # Errors
///
/// - [`AuthorizationError::InvalidAmount`] if `amount` is zero.
/// - [`AuthorizationError::PrecisionOverflow`] if a positive `amount` is
///   worth less than one smallest unit at `rate`.
pub fn to_fixed_point(
    amount: &DecimalAmount,
    rate: &ExchangeRate,
) -> Result<FixedPointAmount, AuthorizationError> {
    if amount.value() <= Decimal::ZERO {
        return Err(AuthorizationError::InvalidAmount(format!(
            "{amount} is not positive"
        )));
    }
    let amount_value = amount.value();
    let rate_value = rate.value();

    // amount = ma / 10^sa, rate = mr / 10^sr
    // units  = floor(ma * 10^(18 + sr) / (mr * 10^sa))
    // Mantissas are below 2^96 and scales at most 28, so neither product
    // exceeds 2^96 * 10^46 < 2^256.
    let numerator = mantissa(amount_value) * pow10(DECIMALS + rate_value.scale());
    let denominator = mantissa(rate_value) * pow10(amount_value.scale());

    let units = numerator / denominator;
    if units.is_zero() {
        return Err(AuthorizationError::PrecisionOverflow(format!(
            "{amount} at {rate} is below one unit of 10^-{DECIMALS}"
        )));
    }
    Ok(FixedPointAmount(units))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(amount: &str, rate: &str) -> Result<FixedPointAmount, AuthorizationError> {
        let amount = DecimalAmount::parse(amount, "USD")?;
        let rate = ExchangeRate::parse(rate)?;
        to_fixed_point(&amount, &rate)
    }

    #[test]
    fn test_price_and_vat_at_450() {
        assert_eq!(convert("0.5", "450").unwrap().to_string(), "1111111111111111");
        assert_eq!(convert("10", "450").unwrap().to_string(), "22222222222222222");
    }

    #[test]
    fn test_truncates_instead_of_rounding() {
        assert_eq!(convert("2", "3").unwrap().to_string(), "666666666666666666");
        assert_eq!(convert("0.000000000000000003", "2").unwrap(), FixedPointAmount::from(1));
    }

    #[test]
    fn test_rejects_amount_below_one_unit() {
        assert!(matches!(
            convert("0.000000000000000001", "2"),
            Err(AuthorizationError::PrecisionOverflow(_))
        ));
        assert!(matches!(
            convert("0.0000000000000000001", "1"),
            Err(AuthorizationError::PrecisionOverflow(_))
        ));
    }

    #[test]
    fn test_exact_quotients() {
        assert_eq!(
            convert("1", "1").unwrap().units(),
            U256::from(1_000_000_000_000_000_000u64)
        );
        assert_eq!(
            convert("1.5", "0.5").unwrap().units(),
            U256::from(3_000_000_000_000_000_000u64)
        );
        assert_eq!(convert("0.000000000000000001", "1").unwrap(), FixedPointAmount::from(1));
    }

    #[test]
    fn test_trailing_zeros_do_not_change_result() {
        assert_eq!(convert("0.50", "450.00").unwrap(), convert("0.5", "450").unwrap());
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let first = convert("19.99", "3127.41").unwrap();
        for _ in 0..10 {
            assert_eq!(convert("19.99", "3127.41").unwrap(), first);
        }
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        assert!(matches!(convert("0", "450"), Err(AuthorizationError::InvalidAmount(_))));
        assert!(matches!(convert("-1", "450"), Err(AuthorizationError::InvalidAmount(_))));
        assert!(matches!(convert("1", "0"), Err(AuthorizationError::InvalidAmount(_))));
        assert!(matches!(convert("1", "-450"), Err(AuthorizationError::InvalidAmount(_))));
    }

    #[test]
    fn test_rejects_malformed_decimal() {
        assert!(matches!(
            DecimalAmount::parse("ten", "USD"),
            Err(AuthorizationError::InvalidAmount(_))
        ));
        assert!(matches!(
            ExchangeRate::parse(""),
            Err(AuthorizationError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_too_many_digits_is_precision_overflow() {
        assert!(matches!(
            DecimalAmount::parse("0.00000000000000000000000000001", "USD"),
            Err(AuthorizationError::PrecisionOverflow(_))
        ));
    }

    #[test]
    fn test_decimal_string_rendering() {
        assert_eq!(FixedPointAmount::from(1_111_111_111_111_111).to_decimal_string(), "0.001111111111111111");
        assert_eq!(FixedPointAmount::from(1_000_000_000_000_000_000).to_decimal_string(), "1");
        assert_eq!(FixedPointAmount::from(1_500_000_000_000_000_000).to_decimal_string(), "1.5");
        assert_eq!(FixedPointAmount::ZERO.to_decimal_string(), "0");
    }

    #[test]
    fn test_checked_add_overflow() {
        let max = FixedPointAmount::from_units(U256::MAX);
        assert_eq!(
            max.checked_add(FixedPointAmount::from(1)),
            Err(AuthorizationError::ArithmeticOverflow)
        );
        assert_eq!(
            FixedPointAmount::from(2).checked_add(FixedPointAmount::from(3)),
            Ok(FixedPointAmount::from(5))
        );
    }

    #[test]
    fn test_fixed_point_serializes_as_string() {
        let amount = FixedPointAmount::from(22_222_222_222_222_222);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"22222222222222222\"");
        let back: FixedPointAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn test_fixed_point_rejects_non_decimal_strings() {
        assert!("0x10".parse::<FixedPointAmount>().is_err());
        assert!("-1".parse::<FixedPointAmount>().is_err());
        assert!("".parse::<FixedPointAmount>().is_err());
        assert!(serde_json::from_str::<FixedPointAmount>("12").is_err());
    }
}
