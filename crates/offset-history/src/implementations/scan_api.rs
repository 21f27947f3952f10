//! Scan-style explorer implementation of the history provider.
//!
//! Fetches an address's transaction list from an Etherscan-compatible
//! HTTP API, then consults the settlement contract for each record's
//! offset status. The explorer endpoint returns at most 10,000 records
//! and silently truncates older history; batches that hit the cap are
//! logged so footprint figures are understood as lower bounds.

use crate::{HistoryError, HistoryInterface};
use alloy_primitives::{Address, TxKind, U256};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_sol_types::{sol, SolCall};
use alloy_transport_http::Http;
use async_trait::async_trait;
use offset_types::RawTransaction;
use serde::Deserialize;

sol! {
	/// Offset-status view on the settlement contract.
	function offsetStatus(address beneficiary, uint256 nonce) external view returns (bool offset);
}

/// One record in the explorer's `txlist` response. All numeric fields
/// arrive as decimal strings.
#[derive(Debug, Deserialize)]
struct ScanRecord {
	hash: Option<String>,
	#[serde(rename = "gasUsed", default)]
	gas_used: String,
	#[serde(default)]
	nonce: String,
	#[serde(rename = "txreceipt_status", default)]
	status: String,
}

/// Envelope of an explorer API response. `result` is an array on
/// success and an explanatory string on failure.
#[derive(Debug, Deserialize)]
struct ScanResponse {
	status: String,
	message: String,
	result: serde_json::Value,
}

/// Explorer-backed history provider.
///
/// Pairs the HTTP transaction list with a per-nonce offset-status
/// lookup against the settlement contract, one view call per record.
pub struct ScanApiHistory {
	/// HTTP client for the explorer API.
	client: reqwest::Client,
	/// Base URL of the explorer API.
	api_url: String,
	/// Optional API key appended to requests.
	api_key: Option<String>,
	/// Documented provider record cap.
	max_records: usize,
	/// Read-side RPC provider for offset-status lookups.
	provider: RootProvider<Http<reqwest::Client>>,
	/// Settlement contract address.
	contract: Address,
}

impl ScanApiHistory {
	/// Creates a new ScanApiHistory instance.
	pub fn new(
		api_url: String,
		api_key: Option<String>,
		max_records: usize,
		rpc_url: &str,
		contract: Address,
	) -> Result<Self, HistoryError> {
		let url = rpc_url
			.parse()
			.map_err(|e| HistoryError::ProviderUnavailable(format!("Invalid RPC URL: {}", e)))?;

		Ok(Self {
			client: reqwest::Client::new(),
			api_url,
			api_key,
			max_records,
			provider: RootProvider::new_http(url),
			contract,
		})
	}

	/// Queries the settlement contract for the offset status of one
	/// (beneficiary, nonce) pair.
	async fn offset_status(&self, beneficiary: Address, nonce: u64) -> Result<bool, HistoryError> {
		let call = offsetStatusCall {
			beneficiary,
			nonce: U256::from(nonce),
		};
		let tx = TransactionRequest {
			to: Some(TxKind::Call(self.contract)),
			input: TransactionInput::new(call.abi_encode().into()),
			..Default::default()
		};

		let output = self
			.provider
			.call(&tx)
			.await
			.map_err(|e| HistoryError::ProviderUnavailable(format!("Status lookup failed: {}", e)))?;

		let decoded = offsetStatusCall::abi_decode_returns(&output, true)
			.map_err(|e| HistoryError::Parse(format!("Bad offsetStatus return: {}", e)))?;

		Ok(decoded.offset)
	}
}

#[async_trait]
impl HistoryInterface for ScanApiHistory {
	async fn fetch_transactions(
		&self,
		address: Address,
	) -> Result<Vec<RawTransaction>, HistoryError> {
		let mut query = vec![
			("module", "account".to_string()),
			("action", "txlist".to_string()),
			("address", address.to_string()),
			("startblock", "0".to_string()),
			("endblock", "99999999".to_string()),
			("sort", "asc".to_string()),
		];
		if let Some(key) = &self.api_key {
			query.push(("apikey", key.clone()));
		}

		let response = self
			.client
			.get(&self.api_url)
			.query(&query)
			.send()
			.await
			.map_err(|e| HistoryError::ProviderUnavailable(e.to_string()))?;

		if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
			return Err(HistoryError::RateLimited);
		}

		let body: ScanResponse = response
			.json()
			.await
			.map_err(|e| HistoryError::Parse(e.to_string()))?;

		let records: Vec<ScanRecord> = match body.result {
			serde_json::Value::Array(_) => serde_json::from_value(body.result)
				.map_err(|e| HistoryError::Parse(e.to_string()))?,
			serde_json::Value::String(reason) => {
				if reason.to_lowercase().contains("rate limit") {
					return Err(HistoryError::RateLimited);
				}
				if body.message.contains("No transactions found") {
					Vec::new()
				} else {
					return Err(HistoryError::ProviderUnavailable(format!(
						"Explorer rejected request ({}): {}",
						body.status, reason
					)));
				}
			},
			_ => {
				return Err(HistoryError::Parse(
					"Unexpected result shape in explorer response".to_string(),
				))
			},
		};

		if records.len() >= self.max_records {
			tracing::warn!(
				address = %address,
				cap = self.max_records,
				"Explorer record cap reached; older history is truncated and footprint figures are lower bounds"
			);
		}

		let mut raw = Vec::with_capacity(records.len());
		for record in records {
			// The offset flag only makes sense for records with a
			// parseable nonce; the formatter drops the rest anyway.
			let offset = match record.nonce.parse::<u64>() {
				Ok(nonce) => self.offset_status(address, nonce).await?,
				Err(_) => false,
			};

			raw.push(RawTransaction {
				hash: record.hash,
				gas_used: record.gas_used,
				nonce: record.nonce,
				status: record.status,
				offset,
			});
		}

		Ok(raw)
	}
}
