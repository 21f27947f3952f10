//! Settlement contract module for the offsetter system.
//!
//! This module handles submission of the on-chain `offset` call and
//! monitoring of its confirmation. It provides the abstraction through
//! which the workflow spends a credit token against recorded
//! footprint, without knowing anything about transports or signing.

use async_trait::async_trait;
use offset_types::{OffsetRequest, TransactionHash, TransactionReceipt};
use std::time::Duration;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod evm;
}

/// Errors that can occur during settlement operations.
#[derive(Debug, Error)]
pub enum SettlementError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// Error that occurs when the node or contract rejects the call.
	/// The message is surfaced verbatim; no automatic retry.
	#[error("Offset call rejected: {0}")]
	Rejected(String),
	/// Error that occurs when the confirmation wait exceeds the
	/// configured deadline.
	#[error("Confirmation not received within {0} seconds")]
	ConfirmationTimeout(u64),
}

/// Trait defining the interface for settlement contract clients.
///
/// Implementations submit the `offset(token, amount, beneficiary,
/// nonces[])` entry point and track the submitted transaction — not
/// unrelated concurrent transactions — until it is mined.
#[async_trait]
pub trait SettlementInterface: Send + Sync {
	/// Submits an offset call to the settlement contract.
	///
	/// Returns the hash of the submitted transaction.
	async fn submit_offset(
		&self,
		request: &OffsetRequest,
	) -> Result<TransactionHash, SettlementError>;

	/// Waits for the given submission to be mined and returns its
	/// receipt. Implementations may poll indefinitely; the service
	/// layer applies the configured deadline.
	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, SettlementError>;
}

/// Service that manages settlement submissions.
///
/// Wraps a settlement implementation and bounds every confirmation
/// wait with the configured timeout, so the workflow surfaces
/// [`SettlementError::ConfirmationTimeout`] instead of hanging
/// indefinitely.
pub struct SettlementService {
	/// The underlying settlement implementation.
	implementation: Box<dyn SettlementInterface>,
	/// Deadline applied to each confirmation wait.
	confirmation_timeout: Duration,
}

impl SettlementService {
	/// Creates a new SettlementService with the specified
	/// implementation and confirmation deadline.
	pub fn new(implementation: Box<dyn SettlementInterface>, confirmation_timeout: Duration) -> Self {
		Self {
			implementation,
			confirmation_timeout,
		}
	}

	/// Submits an offset call.
	pub async fn submit(&self, request: &OffsetRequest) -> Result<TransactionHash, SettlementError> {
		self.implementation.submit_offset(request).await
	}

	/// Waits for confirmation of a specific submission, bounded by the
	/// configured timeout.
	pub async fn confirm(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, SettlementError> {
		match tokio::time::timeout(
			self.confirmation_timeout,
			self.implementation.wait_for_confirmation(hash),
		)
		.await
		{
			Ok(result) => result,
			Err(_) => Err(SettlementError::ConfirmationTimeout(
				self.confirmation_timeout.as_secs(),
			)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use offset_types::{OffsetRequest, TransactionHash, TransactionReceipt};

	/// Implementation whose confirmation never resolves, for deadline
	/// coverage.
	struct StalledSettlement;

	#[async_trait]
	impl SettlementInterface for StalledSettlement {
		async fn submit_offset(
			&self,
			_request: &OffsetRequest,
		) -> Result<TransactionHash, SettlementError> {
			Ok(TransactionHash(vec![0xab; 32]))
		}

		async fn wait_for_confirmation(
			&self,
			_hash: &TransactionHash,
		) -> Result<TransactionReceipt, SettlementError> {
			std::future::pending().await
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_confirmation_deadline_surfaces_timeout() {
		let service = Box::new(StalledSettlement);
		let service = SettlementService::new(service, Duration::from_secs(5));
		let hash = TransactionHash(vec![0xab; 32]);

		let result = service.confirm(&hash).await;
		assert!(matches!(
			result,
			Err(SettlementError::ConfirmationTimeout(5))
		));
	}
}
