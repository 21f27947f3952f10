//! Wallet/session context module for the offsetter system.
//!
//! This module provides the injected session boundary the workflow
//! reads instead of any ambient wallet object: the connected address,
//! whether a signing capability is present, and the credit token
//! balances deposited for that address.

use alloy_primitives::Address;
use async_trait::async_trait;
use offset_types::TokenBalance;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
	/// Error that occurs when a private key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// Error that occurs while reading deposited balances.
	#[error("Balance lookup failed: {0}")]
	Balance(String),
}

/// Trait defining the interface for wallet/session implementations.
///
/// The workflow treats the session as a read-only capability set:
/// address lookup, signing presence, balance query. Balances are
/// supplied by the session and never mutated by the workflow.
#[async_trait]
pub trait SessionInterface: Send + Sync {
	/// The connected wallet address, if any wallet is connected.
	fn connected_address(&self) -> Option<Address>;

	/// Whether a signing capability is available for submissions.
	fn has_signer(&self) -> bool;

	/// The credit token balances deposited for the connected address.
	async fn token_balances(&self) -> Result<Vec<TokenBalance>, SessionError>;
}

/// Service that manages session access.
///
/// Wraps an underlying session implementation, delegating all
/// operations to it.
pub struct SessionService {
	/// The underlying session implementation.
	implementation: Box<dyn SessionInterface>,
}

impl SessionService {
	/// Creates a new SessionService with the specified implementation.
	pub fn new(implementation: Box<dyn SessionInterface>) -> Self {
		Self { implementation }
	}

	/// The connected wallet address, if any.
	pub fn connected_address(&self) -> Option<Address> {
		self.implementation.connected_address()
	}

	/// Whether a signing capability is available.
	pub fn has_signer(&self) -> bool {
		self.implementation.has_signer()
	}

	/// The deposited credit token balances.
	pub async fn token_balances(&self) -> Result<Vec<TokenBalance>, SessionError> {
		self.implementation.token_balances().await
	}
}
