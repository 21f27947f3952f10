//! On-chain submission types.
//!
//! Hash and receipt types for transactions the workflow itself
//! submits to the settlement contract.

use serde::{Deserialize, Serialize};

/// Blockchain transaction hash representation.
///
/// Stores the hash as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHash(pub Vec<u8>);

/// Transaction receipt containing execution details.
///
/// Provides information about a transaction after it has been included
/// in a block, including its success status and block number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TransactionHash,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
}
