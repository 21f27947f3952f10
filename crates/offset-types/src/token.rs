//! Deposited credit token balances.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// A credit token balance held by the connected wallet.
///
/// Supplied by the wallet/session context and read-only to the
/// workflow. The balance is a decimal string in whole-token units;
/// `decimals` carries the token's base-unit scale so amounts can be
/// converted without string-based ether scaling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
	/// Token contract address.
	pub address: Address,
	/// Token symbol, e.g. "TCO2-XYZ".
	pub symbol: String,
	/// Deposited balance as a decimal string, whole-token units.
	pub balance: String,
	/// Number of decimals in the token's smallest unit.
	pub decimals: u8,
}
