//! Conversions between decimal amounts and on-chain base units.
//!
//! The settlement contract takes amounts in the token's smallest unit.
//! These helpers do the scaling with an explicit per-token scale and
//! exact decimal arithmetic, so very small footprints (3.6e-7 tonnes)
//! survive the round trip without precision loss.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while scaling amounts.
#[derive(Debug, Error)]
pub enum ConversionError {
	/// The amount is negative.
	#[error("Amount cannot be negative: {0}")]
	Negative(Decimal),
	/// The amount has more fractional digits than the token supports.
	#[error("Amount {0} has more precision than {1} decimals")]
	PrecisionLoss(Decimal, u8),
	/// The value does not fit the target representation.
	#[error("Value out of range: {0}")]
	OutOfRange(String),
}

/// Scales a decimal amount to the token's smallest unit.
///
/// `to_base_units(dec!(1.5), 18)` yields 1.5 * 10^18. Fractional
/// digits beyond the token's scale are rejected rather than silently
/// rounded.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Result<U256, ConversionError> {
	if amount.is_sign_negative() && !amount.is_zero() {
		return Err(ConversionError::Negative(amount));
	}

	let normalized = amount.normalize();
	let scale = normalized.scale();
	if scale > decimals as u32 {
		return Err(ConversionError::PrecisionLoss(amount, decimals));
	}

	let mantissa = normalized.mantissa().unsigned_abs();
	let exponent = decimals as u32 - scale;
	let base = U256::from(mantissa);
	let multiplier = U256::from(10u8)
		.checked_pow(U256::from(exponent))
		.ok_or_else(|| ConversionError::OutOfRange(format!("scale 10^{}", exponent)))?;
	base.checked_mul(multiplier)
		.ok_or_else(|| ConversionError::OutOfRange(amount.to_string()))
}

/// Converts an on-chain base-unit value back to a decimal amount.
///
/// Fails if the value's magnitude exceeds what a 96-bit decimal
/// mantissa can carry.
pub fn from_base_units(value: U256, decimals: u8) -> Result<Decimal, ConversionError> {
	let raw: u128 = value
		.try_into()
		.map_err(|_| ConversionError::OutOfRange(value.to_string()))?;
	let signed = i128::try_from(raw).map_err(|_| ConversionError::OutOfRange(value.to_string()))?;
	Decimal::try_from_i128_with_scale(signed, decimals as u32)
		.map(|d| d.normalize())
		.map_err(|e| ConversionError::OutOfRange(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	#[test]
	fn test_whole_amount() {
		let amount = Decimal::from_str("1.5").unwrap();
		let scaled = to_base_units(amount, 18).unwrap();
		assert_eq!(scaled, U256::from(1_500_000_000_000_000_000u128));
	}

	#[test]
	fn test_tiny_tonnes_scale_exactly() {
		// One transaction's footprint in tonnes.
		let amount = Decimal::from_str("0.00000036").unwrap();
		let scaled = to_base_units(amount, 18).unwrap();
		assert_eq!(scaled, U256::from(360_000_000_000u128));
	}

	#[test]
	fn test_zero() {
		assert_eq!(to_base_units(Decimal::ZERO, 18).unwrap(), U256::ZERO);
	}

	#[test]
	fn test_precision_loss_rejected() {
		let amount = Decimal::from_str("0.0000001").unwrap();
		assert!(matches!(
			to_base_units(amount, 6),
			Err(ConversionError::PrecisionLoss(_, 6))
		));
	}

	#[test]
	fn test_oversized_scale_rejected() {
		// 10^200 does not fit a 256-bit word; the scale must error out
		// instead of wrapping.
		let amount = Decimal::from_str("1").unwrap();
		assert!(matches!(
			to_base_units(amount, 200),
			Err(ConversionError::OutOfRange(_))
		));
	}

	#[test]
	fn test_negative_rejected() {
		let amount = Decimal::from_str("-1").unwrap();
		assert!(matches!(
			to_base_units(amount, 18),
			Err(ConversionError::Negative(_))
		));
	}

	#[test]
	fn test_round_trip() {
		let amount = Decimal::from_str("42.000001").unwrap();
		let scaled = to_base_units(amount, 18).unwrap();
		let back = from_base_units(scaled, 18).unwrap();
		assert_eq!(back, amount.normalize());
	}
}
