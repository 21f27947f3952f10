//! Transaction history record types.
//!
//! This module defines the wire shape of records returned by a history
//! provider and the normalized form the rest of the workflow consumes.
//! Providers deliver all numeric fields as strings; normalization into
//! [`FormattedTransaction`] happens in the history crate's formatter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw transaction record as delivered by a history provider.
///
/// Scan-style APIs return every numeric field as a decimal string. A
/// record without a hash, or with a non-numeric gas or nonce field, is
/// considered malformed and is dropped during formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
	/// Transaction hash, unique per chain. Absent on malformed records.
	pub hash: Option<String>,
	/// Gas used by the transaction, wei-denominated decimal string.
	#[serde(rename = "gasUsed")]
	pub gas_used: String,
	/// Sender nonce as a decimal string.
	pub nonce: String,
	/// Execution status as delivered by the provider: "1" success, "0" failure.
	#[serde(rename = "txreceipt_status")]
	pub status: String,
	/// Whether this transaction's footprint has already been offset on-chain.
	#[serde(default)]
	pub offset: bool,
}

/// Execution status of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TxStatus {
	/// The transaction executed successfully.
	Success,
	/// The transaction reverted or otherwise failed.
	Failure,
}

impl fmt::Display for TxStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TxStatus::Success => write!(f, "success"),
			TxStatus::Failure => write!(f, "failure"),
		}
	}
}

/// A normalized transaction record.
///
/// Invariants: `hash` is globally unique within a fetched batch;
/// `nonce` is unique per (address, chain). Input order from the
/// provider is preserved through formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedTransaction {
	/// Transaction hash.
	pub hash: String,
	/// Gas used, in wei.
	pub gas_used: u64,
	/// Sender nonce.
	pub nonce: u64,
	/// Execution status.
	pub status: TxStatus,
	/// Whether this transaction has already been offset.
	pub offset: bool,
}
