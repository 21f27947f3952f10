//! Credit token eligibility filtering.

use offset_types::TokenBalance;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Filters deposited balances down to tokens usable for an offset.
///
/// A token is eligible when its balance is non-zero, its symbol is not
/// the excluded reserve symbol, and its balance strictly exceeds the
/// required amount. Both sides of the comparison are parsed as exact
/// decimals; no floating point is involved. Input order is preserved.
///
/// When the required amount is zero or unparseable there is nothing to
/// offset, so no token is eligible.
pub fn eligible_tokens(
	balances: &[TokenBalance],
	required: &str,
	reserve_symbol: &str,
) -> Vec<TokenBalance> {
	let required = match Decimal::from_str(required) {
		Ok(amount) if !amount.is_zero() => amount,
		Ok(_) => return Vec::new(),
		Err(e) => {
			tracing::warn!(required = %required, error = %e, "Unparseable required amount");
			return Vec::new();
		},
	};

	balances
		.iter()
		.filter(|token| {
			if token.symbol == reserve_symbol {
				return false;
			}
			match Decimal::from_str(&token.balance) {
				Ok(balance) => !balance.is_zero() && balance > required,
				Err(e) => {
					tracing::warn!(
						token = %token.symbol,
						balance = %token.balance,
						error = %e,
						"Skipping token with unparseable balance"
					);
					false
				},
			}
		})
		.cloned()
		.collect()
}
