//! Local private-key session implementation.
//!
//! Holds an in-process signer and reads the connected address's
//! deposited credit balances straight from the settlement contract,
//! one view call per configured token.

use crate::{SessionError, SessionInterface};
use alloy_primitives::{Address, TxKind};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{sol, SolCall};
use alloy_transport_http::Http;
use async_trait::async_trait;
use offset_config::TokenConfig;
use offset_types::{from_base_units, TokenBalance};

sol! {
	/// Deposited-balance view on the settlement contract.
	function deposits(address user, address token) external view returns (uint256 amount);
}

/// Session backed by a local private key.
///
/// A missing key models a disconnected wallet: no address, no signer,
/// no balances.
pub struct LocalSession {
	/// Signer for the connected wallet, if one is configured.
	signer: Option<PrivateKeySigner>,
	/// Read-side RPC provider for balance lookups.
	provider: RootProvider<Http<reqwest::Client>>,
	/// Settlement contract address.
	contract: Address,
	/// Credit tokens known to the deployment.
	tokens: Vec<TokenConfig>,
}

impl LocalSession {
	/// Creates a new LocalSession.
	///
	/// `private_key` may be None to model a disconnected wallet.
	pub fn new(
		private_key: Option<&str>,
		rpc_url: &str,
		contract: Address,
		tokens: Vec<TokenConfig>,
	) -> Result<Self, SessionError> {
		let signer = match private_key {
			Some(key) => Some(
				key.parse::<PrivateKeySigner>()
					.map_err(|e| SessionError::InvalidKey(e.to_string()))?,
			),
			None => None,
		};

		let url = rpc_url
			.parse()
			.map_err(|e| SessionError::Balance(format!("Invalid RPC URL: {}", e)))?;

		Ok(Self {
			signer,
			provider: RootProvider::new_http(url),
			contract,
			tokens,
		})
	}

	/// Reads one deposited balance from the settlement contract.
	async fn deposit_of(&self, user: Address, token: &TokenConfig) -> Result<String, SessionError> {
		let call = depositsCall {
			user,
			token: token.address,
		};
		let tx = TransactionRequest {
			to: Some(TxKind::Call(self.contract)),
			input: TransactionInput::new(call.abi_encode().into()),
			..Default::default()
		};

		let output = self.provider.call(&tx).await.map_err(|e| {
			tracing::warn!(
				token = %token.symbol,
				error = %e,
				"Deposit balance lookup failed"
			);
			SessionError::Balance(e.to_string())
		})?;

		let decoded = depositsCall::abi_decode_returns(&output, true)
			.map_err(|e| SessionError::Balance(format!("Bad deposits return: {}", e)))?;

		let amount = from_base_units(decoded.amount, token.decimals)
			.map_err(|e| SessionError::Balance(e.to_string()))?;

		Ok(amount.to_string())
	}
}

#[async_trait]
impl SessionInterface for LocalSession {
	fn connected_address(&self) -> Option<Address> {
		self.signer.as_ref().map(|s| s.address())
	}

	fn has_signer(&self) -> bool {
		self.signer.is_some()
	}

	async fn token_balances(&self) -> Result<Vec<TokenBalance>, SessionError> {
		let Some(user) = self.connected_address() else {
			return Ok(Vec::new());
		};

		tracing::debug!(user = %user, tokens = self.tokens.len(), "Reading deposited balances");

		let mut balances = Vec::with_capacity(self.tokens.len());
		for token in &self.tokens {
			let balance = self.deposit_of(user, token).await?;
			balances.push(TokenBalance {
				address: token.address,
				symbol: token.symbol.clone(),
				balance,
				decimals: token.decimals,
			});
		}

		Ok(balances)
	}
}
