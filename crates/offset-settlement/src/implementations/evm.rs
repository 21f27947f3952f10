//! EVM settlement implementation using the Alloy library.
//!
//! Encodes the `offset(token, amount, beneficiary, nonces[])` call,
//! submits it through a wallet-backed provider, and polls for the
//! receipt of that specific submission.

use crate::{SettlementError, SettlementInterface};
use alloy_network::EthereumWallet;
use alloy_primitives::{FixedBytes, TxKind};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{sol, SolCall};
use alloy_transport_http::Http;
use async_trait::async_trait;
use offset_types::{with_0x_prefix, OffsetRequest, TransactionHash, TransactionReceipt};
use std::sync::Arc;

sol! {
	/// The settlement contract's offset entry point.
	function offset(address token, uint256 amount, address beneficiary, uint256[] calldata nonces) external;
}

/// Alloy-based EVM settlement client.
///
/// Transaction signing is handled by the provider's wallet filler;
/// the signer is installed at construction time.
pub struct EvmSettlement {
	/// Wallet-backed provider for the settlement chain.
	provider: Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
	/// Settlement contract address.
	contract: alloy_primitives::Address,
	/// Interval between receipt polls while confirming.
	poll_interval: std::time::Duration,
}

impl EvmSettlement {
	/// Creates a new EvmSettlement instance.
	pub fn new(
		rpc_url: &str,
		chain_id: u64,
		contract: alloy_primitives::Address,
		signer: PrivateKeySigner,
		poll_interval: std::time::Duration,
	) -> Result<Self, SettlementError> {
		let url = rpc_url
			.parse()
			.map_err(|e| SettlementError::Network(format!("Invalid RPC URL: {}", e)))?;

		let chain_signer = signer.with_chain_id(Some(chain_id));
		let wallet = EthereumWallet::from(chain_signer);

		let provider = ProviderBuilder::new()
			.with_recommended_fillers()
			.wallet(wallet)
			.on_http(url);

		Ok(Self {
			provider: Arc::new(provider) as Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
			contract,
			poll_interval,
		})
	}
}

#[async_trait]
impl SettlementInterface for EvmSettlement {
	async fn submit_offset(
		&self,
		request: &OffsetRequest,
	) -> Result<TransactionHash, SettlementError> {
		let call = offsetCall {
			token: request.token,
			amount: request.amount,
			beneficiary: request.beneficiary,
			nonces: request.nonces.clone(),
		};

		let tx = TransactionRequest {
			to: Some(TxKind::Call(self.contract)),
			input: TransactionInput::new(call.abi_encode().into()),
			..Default::default()
		};

		// The node surfaces reverts and estimation failures here; the
		// message passes through verbatim and nothing is retried.
		let pending = self
			.provider
			.send_transaction(tx)
			.await
			.map_err(|e| SettlementError::Rejected(e.to_string()))?;

		let tx_hash = *pending.tx_hash();
		tracing::info!(
			tx_hash = %with_0x_prefix(&hex::encode(tx_hash.0)),
			beneficiary = %request.beneficiary,
			nonces = request.nonces.len(),
			"Submitted offset call"
		);

		Ok(TransactionHash(tx_hash.0.to_vec()))
	}

	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, SettlementError> {
		let tx_hash = FixedBytes::<32>::from_slice(&hash.0);

		loop {
			match self.provider.get_transaction_receipt(tx_hash).await {
				Ok(Some(receipt)) => {
					return Ok(TransactionReceipt {
						hash: hash.clone(),
						block_number: receipt.block_number.unwrap_or_default(),
						success: receipt.status(),
					});
				},
				Ok(None) => {
					// Not yet mined; the service layer bounds the
					// overall wait.
					tokio::time::sleep(self.poll_interval).await;
				},
				Err(e) => {
					return Err(SettlementError::Network(format!(
						"Failed to get receipt: {}",
						e
					)));
				},
			}
		}
	}
}
