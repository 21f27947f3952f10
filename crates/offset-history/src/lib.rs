//! Transaction history module for the offsetter system.
//!
//! This module handles fetching the on-chain activity of an address
//! from a history provider and normalizing it into the record shape
//! the rest of the workflow consumes. It provides abstractions so the
//! workflow never talks to an explorer API directly.

use async_trait::async_trait;
use alloy_primitives::Address;
use offset_types::{FormattedTransaction, RawTransaction};
use thiserror::Error;

pub mod format;

/// Re-export implementations
pub mod implementations {
	pub mod scan_api;
}

/// Errors that can occur while fetching transaction history.
#[derive(Debug, Error)]
pub enum HistoryError {
	/// Error that occurs when the provider cannot be reached or
	/// returns a malformed response.
	#[error("History provider unavailable: {0}")]
	ProviderUnavailable(String),
	/// Error that occurs when the provider rejects the request due to
	/// rate limiting.
	#[error("History provider rate limit reached")]
	RateLimited,
	/// Error that occurs when decoding the provider response fails.
	#[error("Parse error: {0}")]
	Parse(String),
}

/// Trait defining the interface for transaction history providers.
///
/// A provider returns the raw activity of an address, bounded by the
/// documented 10,000-record cap. Older history beyond the cap is
/// silently truncated by the provider, so footprint figures derived
/// from a capped batch are lower bounds, not exact totals.
#[async_trait]
pub trait HistoryInterface: Send + Sync {
	/// Fetches the raw transaction records for the given address,
	/// including each record's prior-offset status.
	async fn fetch_transactions(&self, address: Address)
		-> Result<Vec<RawTransaction>, HistoryError>;
}

/// Service that manages history retrieval.
///
/// Wraps a provider implementation and applies the transaction
/// formatter to its output, so consumers always see normalized,
/// order-preserved records.
pub struct HistoryService {
	/// The underlying provider implementation.
	implementation: Box<dyn HistoryInterface>,
}

impl HistoryService {
	/// Creates a new HistoryService with the specified implementation.
	pub fn new(implementation: Box<dyn HistoryInterface>) -> Self {
		Self { implementation }
	}

	/// Fetches and normalizes the transaction history for an address.
	///
	/// Malformed individual records are dropped by the formatter with
	/// a logged warning; only provider-level failures surface as
	/// errors.
	pub async fn fetch_formatted(
		&self,
		address: Address,
	) -> Result<Vec<FormattedTransaction>, HistoryError> {
		let raw = self.implementation.fetch_transactions(address).await?;
		Ok(format::format_transactions(raw))
	}
}
