//! The settlement call payload.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Parameters for one `offset(token, amount, beneficiary, nonces[])`
/// contract call.
///
/// Constructed fresh for every submission attempt from the current
/// view state; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetRequest {
	/// Address of the credit token to spend.
	pub token: Address,
	/// Outstanding footprint in tonnes, scaled to the token's smallest unit.
	pub amount: U256,
	/// The address whose footprint is being settled. Not necessarily
	/// the connected wallet; offsetting on behalf of another address
	/// is supported.
	pub beneficiary: Address,
	/// Nonces of all currently-unoffset transactions, in batch order.
	pub nonces: Vec<U256>,
}
