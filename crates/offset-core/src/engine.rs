//! The offset workflow orchestrator.
//!
//! Drives the full lifecycle: fetch history, derive the footprint,
//! filter eligible credit tokens, submit the offset call, await its
//! confirmation, and reconcile against fresh chain data afterward.
//! Every outcome, success or failure, ends with a notification and a
//! refetch of the inspected address.

use crate::eligibility::eligible_tokens;
use crate::footprint::compute_footprint;
use crate::notify::Notifier;
use crate::state::{Phase, StateHolder, ViewState};
use alloy_primitives::{Address, U256};
use offset_history::{HistoryError, HistoryService};
use offset_session::SessionService;
use offset_settlement::{SettlementError, SettlementService};
use offset_types::{to_base_units, OffsetRequest, TokenBalance, TransactionReceipt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced at the orchestrator boundary.
///
/// All of these become a single user notification; none propagate past
/// the engine.
#[derive(Debug, Error)]
pub enum OffsetError {
	/// A submission precondition was not met.
	#[error("{0}")]
	Validation(String),
	/// The history provider failed.
	#[error(transparent)]
	Provider(#[from] HistoryError),
	/// The settlement contract rejected, lost or timed out the call.
	#[error(transparent)]
	Contract(#[from] SettlementError),
	/// Another workflow is already in flight on this engine.
	#[error("Another offset workflow is already in progress")]
	Busy,
}

/// Orchestrates the offset workflow over the injected services.
///
/// At most one workflow (fetch or submission) runs at a time; a second
/// action issued while one is pending is rejected, not queued. State
/// is exposed through immutable [`ViewState`] snapshots.
pub struct OffsetEngine {
	/// Transaction history retrieval.
	history: HistoryService,
	/// Wallet/session context.
	session: SessionService,
	/// Settlement contract access.
	settlement: SettlementService,
	/// User notification sink.
	notifier: Arc<dyn Notifier>,
	/// Symbol excluded from eligibility (the pool reserve token).
	reserve_symbol: String,
	/// Atomic view state.
	state: StateHolder,
	/// Held for the duration of any workflow; try-locked, never awaited.
	busy: tokio::sync::Mutex<()>,
	/// Tags each fetch so stale completions can be discarded.
	generation: AtomicU64,
}

impl OffsetEngine {
	/// Creates an engine over the given services.
	pub fn new(
		history: HistoryService,
		session: SessionService,
		settlement: SettlementService,
		notifier: Arc<dyn Notifier>,
		reserve_symbol: String,
	) -> Self {
		Self {
			history,
			session,
			settlement,
			notifier,
			reserve_symbol,
			state: StateHolder::new(),
			busy: tokio::sync::Mutex::new(()),
			generation: AtomicU64::new(0),
		}
	}

	/// Returns the current view state snapshot.
	pub fn state(&self) -> Arc<ViewState> {
		self.state.load()
	}

	/// Records the credit token chosen for the next offset.
	pub fn select_token(&self, token: Option<TokenBalance>) {
		self.state.select_token(token);
	}

	/// Fetches and loads the transaction history for an address.
	///
	/// On provider failure the user is notified and the state returns
	/// to idle with no partial batch retained.
	pub async fn load_transactions(&self, address: Address) -> Result<(), OffsetError> {
		let _busy = match self.busy.try_lock() {
			Ok(guard) => guard,
			Err(_) => {
				self.notifier.error(&OffsetError::Busy.to_string());
				return Err(OffsetError::Busy);
			},
		};

		let result = self.refresh(address).await;
		if let Err(e) = &result {
			self.notifier.error(&e.to_string());
		}
		result
	}

	/// Deposited tokens eligible to cover the outstanding footprint.
	///
	/// The required amount is the outstanding kilogram figure from the
	/// current snapshot, compared exactly against each balance.
	pub async fn eligible_tokens(&self) -> Result<Vec<TokenBalance>, OffsetError> {
		let view = self.state.load();
		let balances = self
			.session
			.token_balances()
			.await
			.map_err(|e| OffsetError::Validation(e.to_string()))?;
		let required = view.snapshot.overall_emissions_kg.normalize().to_string();
		Ok(eligible_tokens(&balances, &required, &self.reserve_symbol))
	}

	/// Submits an offset for the loaded batch and selected token.
	///
	/// Preconditions are checked in order and fail fast: wallet
	/// connected, signer present, transactions loaded, token selected,
	/// outstanding footprint non-zero. Whatever the outcome, the
	/// inspected address is refetched afterward so the locally held
	/// offset flags reflect chain truth.
	pub async fn submit_offset(&self) -> Result<(), OffsetError> {
		let _busy = match self.busy.try_lock() {
			Ok(guard) => guard,
			Err(_) => {
				self.notifier.error(&OffsetError::Busy.to_string());
				return Err(OffsetError::Busy);
			},
		};

		let view = self.state.load();
		let (request, address) = match self.prepare_request(&view) {
			Ok(prepared) => prepared,
			Err(e) => {
				self.notifier.error(&e.to_string());
				// Even an aborted attempt ends with reconciliation
				// when a batch address is known.
				if let Some(address) = view.address {
					if let Err(refresh_err) = self.refresh(address).await {
						self.notifier.error(&refresh_err.to_string());
					}
				}
				return Err(e);
			},
		};

		tracing::info!(
			beneficiary = %address,
			token = %request.token,
			nonces = request.nonces.len(),
			"Submitting offset"
		);

		let outcome = self.settle(&request).await;
		match &outcome {
			Ok(receipt) => {
				self.state.set_phase(Phase::Settled);
				self.notifier.success(&format!(
					"Offset settled in block {}",
					receipt.block_number
				));
			},
			Err(e) => {
				self.state.set_phase(Phase::Failed);
				self.notifier.error(&e.to_string());
			},
		}

		// Reconcile with chain truth regardless of outcome.
		if let Err(e) = self.refresh(address).await {
			self.notifier.error(&e.to_string());
		}

		outcome.map(|_| ())
	}

	/// Validates the submission preconditions, in order, and builds the
	/// settlement request.
	fn prepare_request(&self, view: &ViewState) -> Result<(OffsetRequest, Address), OffsetError> {
		if self.session.connected_address().is_none() {
			return Err(OffsetError::Validation("No wallet is connected".to_string()));
		}
		if !self.session.has_signer() {
			return Err(OffsetError::Validation(
				"No signing capability is available".to_string(),
			));
		}
		let transactions = view.transactions.as_ref().ok_or_else(|| {
			OffsetError::Validation("No transactions are loaded".to_string())
		})?;
		let token = view.selected_token.as_ref().ok_or_else(|| {
			OffsetError::Validation("No credit token is selected".to_string())
		})?;
		if !view.snapshot.has_outstanding() {
			return Err(OffsetError::Validation(
				"No outstanding footprint to offset".to_string(),
			));
		}

		// A loaded batch always carries its address.
		let address = view.address.ok_or_else(|| {
			OffsetError::Validation("No transactions are loaded".to_string())
		})?;

		let amount = to_base_units(view.snapshot.overall_emissions_tonnes, token.decimals)
			.map_err(|e| {
				OffsetError::Validation(format!(
					"Cannot express {} tonnes in {} ({}): {}",
					view.snapshot.display_tonnes(),
					token.symbol,
					token.decimals,
					e
				))
			})?;

		let nonces: Vec<U256> = transactions
			.iter()
			.filter(|tx| !tx.offset)
			.map(|tx| U256::from(tx.nonce))
			.collect();

		Ok((
			OffsetRequest {
				token: token.address,
				amount,
				beneficiary: address,
				nonces,
			},
			address,
		))
	}

	/// Submits the call and waits for its receipt.
	async fn settle(&self, request: &OffsetRequest) -> Result<TransactionReceipt, OffsetError> {
		self.state.set_phase(Phase::Submitting);
		let hash = self.settlement.submit(request).await?;

		self.state.set_phase(Phase::Confirming);
		let receipt = self.settlement.confirm(&hash).await?;

		if !receipt.success {
			return Err(OffsetError::Contract(SettlementError::Rejected(
				"transaction reverted on-chain".to_string(),
			)));
		}
		Ok(receipt)
	}

	/// Fetches a fresh batch and swaps it into the view state.
	///
	/// Each fetch is generation-tagged; if another fetch started while
	/// this one was in flight, its result is discarded rather than
	/// overwriting newer state.
	async fn refresh(&self, address: Address) -> Result<(), OffsetError> {
		let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
		self.state.set_phase(Phase::Fetching);

		let fetched = self.history.fetch_formatted(address).await;

		if self.generation.load(Ordering::SeqCst) != generation {
			tracing::debug!(%address, generation, "Discarding stale fetch result");
			return Ok(());
		}

		match fetched {
			Ok(transactions) => {
				let snapshot = compute_footprint(&transactions);
				tracing::debug!(
					%address,
					transactions = transactions.len(),
					tonnes = %snapshot.display_tonnes(),
					"Loaded transaction batch"
				);
				self.state.set_batch(address, transactions, snapshot);
				Ok(())
			},
			Err(e) => {
				self.state.clear_batch();
				Err(OffsetError::Provider(e))
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use offset_history::HistoryInterface;
	use offset_session::{SessionError, SessionInterface};
	use offset_settlement::SettlementInterface;
	use offset_types::{RawTransaction, TransactionHash};
	use std::sync::atomic::{AtomicBool, AtomicUsize};
	use std::sync::Mutex;
	use std::time::Duration;

	fn raw_tx(nonce: u64, offset: bool) -> RawTransaction {
		RawTransaction {
			hash: Some(format!("0x{:064x}", nonce)),
			gas_used: "21000".to_string(),
			nonce: nonce.to_string(),
			status: "1".to_string(),
			offset,
		}
	}

	fn nct(balance: &str) -> TokenBalance {
		TokenBalance {
			address: Address::repeat_byte(0x22),
			symbol: "NCT".to_string(),
			balance: balance.to_string(),
			decimals: 18,
		}
	}

	/// History mock that reports every record as offset once the paired
	/// settlement mock has settled, mimicking chain reconciliation.
	struct MockHistory {
		records: Vec<RawTransaction>,
		settled: Arc<AtomicBool>,
		fetches: Arc<AtomicUsize>,
	}

	#[async_trait]
	impl HistoryInterface for MockHistory {
		async fn fetch_transactions(
			&self,
			_address: Address,
		) -> Result<Vec<RawTransaction>, HistoryError> {
			self.fetches.fetch_add(1, Ordering::SeqCst);
			let settled = self.settled.load(Ordering::SeqCst);
			Ok(self
				.records
				.iter()
				.map(|r| {
					let mut record = r.clone();
					if settled {
						record.offset = true;
					}
					record
				})
				.collect())
		}
	}

	/// History mock parked on a gate until released, so a workflow can
	/// be held in flight while another action is issued.
	struct GatedHistory {
		gate: Arc<tokio::sync::Notify>,
		records: Vec<RawTransaction>,
	}

	#[async_trait]
	impl HistoryInterface for GatedHistory {
		async fn fetch_transactions(
			&self,
			_address: Address,
		) -> Result<Vec<RawTransaction>, HistoryError> {
			self.gate.notified().await;
			Ok(self.records.clone())
		}
	}

	/// History mock whose first fetch parks on a gate and returns a
	/// two-record batch; later fetches return a single fresh record
	/// immediately.
	struct StaleThenFresh {
		gate: Arc<tokio::sync::Notify>,
		calls: AtomicUsize,
	}

	#[async_trait]
	impl HistoryInterface for StaleThenFresh {
		async fn fetch_transactions(
			&self,
			_address: Address,
		) -> Result<Vec<RawTransaction>, HistoryError> {
			if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
				self.gate.notified().await;
				Ok(vec![raw_tx(0, false), raw_tx(1, false)])
			} else {
				Ok(vec![raw_tx(7, false)])
			}
		}
	}

	struct FailingHistory;

	#[async_trait]
	impl HistoryInterface for FailingHistory {
		async fn fetch_transactions(
			&self,
			_address: Address,
		) -> Result<Vec<RawTransaction>, HistoryError> {
			Err(HistoryError::ProviderUnavailable("boom".to_string()))
		}
	}

	struct MockSession {
		address: Option<Address>,
		signer: bool,
		balances: Vec<TokenBalance>,
	}

	#[async_trait]
	impl SessionInterface for MockSession {
		fn connected_address(&self) -> Option<Address> {
			self.address
		}

		fn has_signer(&self) -> bool {
			self.signer
		}

		async fn token_balances(&self) -> Result<Vec<TokenBalance>, SessionError> {
			Ok(self.balances.clone())
		}
	}

	/// Settlement mock that records submissions and flips the shared
	/// settled flag so the history mock reflects the offset.
	struct MockSettlement {
		submitted: Arc<Mutex<Vec<OffsetRequest>>>,
		settled: Arc<AtomicBool>,
	}

	#[async_trait]
	impl SettlementInterface for MockSettlement {
		async fn submit_offset(
			&self,
			request: &OffsetRequest,
		) -> Result<TransactionHash, SettlementError> {
			self.submitted
				.lock()
				.unwrap()
				.push(request.clone());
			Ok(TransactionHash(vec![0xcd; 32]))
		}

		async fn wait_for_confirmation(
			&self,
			hash: &TransactionHash,
		) -> Result<offset_types::TransactionReceipt, SettlementError> {
			self.settled.store(true, Ordering::SeqCst);
			Ok(offset_types::TransactionReceipt {
				hash: hash.clone(),
				block_number: 1234,
				success: true,
			})
		}
	}

	struct RecordingNotifier {
		messages: Mutex<Vec<String>>,
	}

	impl RecordingNotifier {
		fn new() -> Arc<Self> {
			Arc::new(Self {
				messages: Mutex::new(Vec::new()),
			})
		}
	}

	impl Notifier for RecordingNotifier {
		fn success(&self, message: &str) {
			self.messages
				.lock()
				.unwrap()
				.push(format!("success: {}", message));
		}

		fn error(&self, message: &str) {
			self.messages
				.lock()
				.unwrap()
				.push(format!("error: {}", message));
		}
	}

	struct Harness {
		engine: OffsetEngine,
		submitted: Arc<Mutex<Vec<OffsetRequest>>>,
		fetches: Arc<AtomicUsize>,
		notifier: Arc<RecordingNotifier>,
	}

	fn harness(records: Vec<RawTransaction>, session: MockSession) -> Harness {
		let settled = Arc::new(AtomicBool::new(false));
		let submitted = Arc::new(Mutex::new(Vec::new()));
		let fetches = Arc::new(AtomicUsize::new(0));
		let notifier = RecordingNotifier::new();

		let engine = OffsetEngine::new(
			HistoryService::new(Box::new(MockHistory {
				records,
				settled: settled.clone(),
				fetches: fetches.clone(),
			})),
			SessionService::new(Box::new(session)),
			SettlementService::new(
				Box::new(MockSettlement {
					submitted: submitted.clone(),
					settled,
				}),
				Duration::from_secs(600),
			),
			notifier.clone(),
			"BCT".to_string(),
		);

		Harness {
			engine,
			submitted,
			fetches,
			notifier,
		}
	}

	fn connected_session() -> MockSession {
		MockSession {
			address: Some(Address::repeat_byte(0x33)),
			signer: true,
			balances: vec![nct("5.0")],
		}
	}

	#[tokio::test]
	async fn test_load_transactions_builds_snapshot() {
		let h = harness(vec![raw_tx(0, false), raw_tx(1, true)], connected_session());

		h.engine
			.load_transactions(Address::repeat_byte(0x11))
			.await
			.unwrap();

		let state = h.engine.state();
		assert_eq!(state.phase, Phase::Ready);
		assert_eq!(state.transactions.as_ref().map(Vec::len), Some(2));
		assert_eq!(state.snapshot.overall_gas_used, 42000);
		assert_eq!(state.snapshot.display_tonnes(), "0.00000036");
	}

	#[tokio::test]
	async fn test_provider_failure_notifies_and_resets() {
		let notifier = RecordingNotifier::new();
		let engine = OffsetEngine::new(
			HistoryService::new(Box::new(FailingHistory)),
			SessionService::new(Box::new(connected_session())),
			SettlementService::new(
				Box::new(MockSettlement {
					submitted: Arc::new(Mutex::new(Vec::new())),
					settled: Arc::new(AtomicBool::new(false)),
				}),
				Duration::from_secs(600),
			),
			notifier.clone(),
			"BCT".to_string(),
		);

		let result = engine.load_transactions(Address::repeat_byte(0x11)).await;
		assert!(matches!(result, Err(OffsetError::Provider(_))));

		let state = engine.state();
		assert_eq!(state.phase, Phase::Idle);
		assert!(state.transactions.is_none());
		assert_eq!(notifier.messages.lock().unwrap().len(), 1);
	}

	#[tokio::test]
	async fn test_submit_without_token_is_rejected_before_contract() {
		let h = harness(vec![raw_tx(0, false)], connected_session());
		h.engine
			.load_transactions(Address::repeat_byte(0x11))
			.await
			.unwrap();

		let result = h.engine.submit_offset().await;
		assert!(matches!(result, Err(OffsetError::Validation(_))));
		assert!(h.submitted.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_submit_without_wallet_fails_first() {
		let session = MockSession {
			address: None,
			signer: false,
			balances: Vec::new(),
		};
		let h = harness(vec![raw_tx(0, false)], session);

		let result = h.engine.submit_offset().await;
		match result {
			Err(OffsetError::Validation(message)) => {
				assert!(message.contains("wallet"));
			},
			other => panic!("unexpected outcome: {:?}", other.map(|_| ())),
		}
		assert!(h.submitted.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_submit_settles_and_reconciles() {
		let h = harness(
			vec![raw_tx(0, false), raw_tx(1, true), raw_tx(2, false)],
			connected_session(),
		);
		let address = Address::repeat_byte(0x11);
		h.engine.load_transactions(address).await.unwrap();
		h.engine.select_token(Some(nct("5.0")));

		h.engine.submit_offset().await.unwrap();

		// One request carrying only the unoffset nonces, for the
		// inspected address.
		let submitted = h.submitted.lock().unwrap();
		assert_eq!(submitted.len(), 1);
		let request = &submitted[0];
		assert_eq!(request.beneficiary, address);
		assert_eq!(request.nonces, vec![U256::from(0), U256::from(2)]);
		// Two unoffset transactions: 7.2e-7 tonnes at 18 decimals.
		assert_eq!(request.amount, U256::from(720_000_000_000u64));
		drop(submitted);

		// The refetch after settlement shows every record offset.
		let state = h.engine.state();
		assert_eq!(state.phase, Phase::Ready);
		assert!(state
			.transactions
			.as_ref()
			.unwrap()
			.iter()
			.all(|tx| tx.offset));
		assert!(!state.snapshot.has_outstanding());

		// Initial load plus post-settlement reconciliation.
		assert_eq!(h.fetches.load(Ordering::SeqCst), 2);

		let messages = h.notifier.messages.lock().unwrap();
		assert!(messages.iter().any(|m| m.starts_with("success:")));
	}

	#[tokio::test]
	async fn test_fully_offset_batch_rejects_submission() {
		let h = harness(vec![raw_tx(0, true)], connected_session());
		h.engine
			.load_transactions(Address::repeat_byte(0x11))
			.await
			.unwrap();
		h.engine.select_token(Some(nct("5.0")));

		let result = h.engine.submit_offset().await;
		assert!(matches!(result, Err(OffsetError::Validation(_))));
		assert!(h.submitted.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_second_workflow_rejected_while_one_in_flight() {
		let gate = Arc::new(tokio::sync::Notify::new());
		let engine = Arc::new(OffsetEngine::new(
			HistoryService::new(Box::new(GatedHistory {
				gate: gate.clone(),
				records: vec![raw_tx(0, false)],
			})),
			SessionService::new(Box::new(connected_session())),
			SettlementService::new(
				Box::new(MockSettlement {
					submitted: Arc::new(Mutex::new(Vec::new())),
					settled: Arc::new(AtomicBool::new(false)),
				}),
				Duration::from_secs(600),
			),
			RecordingNotifier::new(),
			"BCT".to_string(),
		));

		let address = Address::repeat_byte(0x11);
		let in_flight = tokio::spawn({
			let engine = engine.clone();
			async move { engine.load_transactions(address).await }
		});
		// Let the first fetch park on the gate.
		tokio::task::yield_now().await;

		assert!(matches!(
			engine.load_transactions(address).await,
			Err(OffsetError::Busy)
		));
		assert!(matches!(engine.submit_offset().await, Err(OffsetError::Busy)));

		gate.notify_one();
		in_flight.await.unwrap().unwrap();
		assert_eq!(engine.state().phase, Phase::Ready);
	}

	#[tokio::test]
	async fn test_stale_fetch_does_not_overwrite_newer_state() {
		let gate = Arc::new(tokio::sync::Notify::new());
		let engine = Arc::new(OffsetEngine::new(
			HistoryService::new(Box::new(StaleThenFresh {
				gate: gate.clone(),
				calls: AtomicUsize::new(0),
			})),
			SessionService::new(Box::new(connected_session())),
			SettlementService::new(
				Box::new(MockSettlement {
					submitted: Arc::new(Mutex::new(Vec::new())),
					settled: Arc::new(AtomicBool::new(false)),
				}),
				Duration::from_secs(600),
			),
			RecordingNotifier::new(),
			"BCT".to_string(),
		));

		let stale_target = Address::repeat_byte(0x11);
		let stale = tokio::spawn({
			let engine = engine.clone();
			async move { engine.refresh(stale_target).await }
		});
		// Let the first fetch park on the gate.
		tokio::task::yield_now().await;

		// A newer fetch for a different address completes first.
		let fresh_target = Address::repeat_byte(0x22);
		engine.refresh(fresh_target).await.unwrap();

		gate.notify_one();
		stale.await.unwrap().unwrap();

		// The stale completion is discarded; the newer batch and its
		// concluded phase survive.
		let state = engine.state();
		assert_eq!(state.address, Some(fresh_target));
		assert_eq!(state.transactions.as_ref().map(Vec::len), Some(1));
		assert_eq!(state.transactions.as_ref().unwrap()[0].nonce, 7);
		assert_eq!(state.phase, Phase::Ready);
	}

	#[tokio::test]
	async fn test_eligible_tokens_use_outstanding_kilograms() {
		let session = MockSession {
			address: Some(Address::repeat_byte(0x33)),
			signer: true,
			balances: vec![nct("5.0"), {
				let mut reserve = nct("100.0");
				reserve.symbol = "BCT".to_string();
				reserve
			}],
		};
		let h = harness(vec![raw_tx(0, false)], session);
		h.engine
			.load_transactions(Address::repeat_byte(0x11))
			.await
			.unwrap();

		let eligible = h.engine.eligible_tokens().await.unwrap();
		let symbols: Vec<&str> = eligible.iter().map(|t| t.symbol.as_str()).collect();
		assert_eq!(symbols, vec!["NCT"]);
	}

	#[tokio::test]
	async fn test_no_batch_means_no_eligible_tokens() {
		let h = harness(Vec::new(), connected_session());

		// Nothing loaded: required amount is zero, nothing qualifies.
		let eligible = h.engine.eligible_tokens().await.unwrap();
		assert!(eligible.is_empty());
	}
}
