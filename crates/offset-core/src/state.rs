//! View state holder for the offset workflow.
//!
//! All workflow-visible state lives in one immutable snapshot behind
//! an [`arc_swap::ArcSwap`]. Updates replace the whole snapshot, so a
//! reader can never observe a transaction batch paired with a
//! footprint computed from a different batch.

use alloy_primitives::Address;
use arc_swap::ArcSwap;
use offset_types::{FootprintSnapshot, FormattedTransaction, TokenBalance};
use std::sync::Arc;

/// Lifecycle phase of the offset workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	/// No batch loaded.
	Idle,
	/// A history fetch is in flight.
	Fetching,
	/// A batch and its footprint are loaded.
	Ready,
	/// An offset call has been handed to the settlement contract.
	Submitting,
	/// The offset transaction was accepted and is awaiting a receipt.
	Confirming,
	/// The offset transaction was mined successfully.
	Settled,
	/// The offset attempt failed.
	Failed,
}

impl std::fmt::Display for Phase {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			Phase::Idle => "idle",
			Phase::Fetching => "fetching",
			Phase::Ready => "ready",
			Phase::Submitting => "submitting",
			Phase::Confirming => "confirming",
			Phase::Settled => "settled",
			Phase::Failed => "failed",
		};
		write!(f, "{}", s)
	}
}

/// One immutable snapshot of everything the workflow exposes.
#[derive(Debug, Clone)]
pub struct ViewState {
	/// Address whose history the loaded batch belongs to.
	pub address: Option<Address>,
	/// Current workflow phase.
	pub phase: Phase,
	/// Loaded transaction batch; `None` until a fetch succeeds.
	pub transactions: Option<Vec<FormattedTransaction>>,
	/// Footprint derived from `transactions`. Always from the same
	/// batch as `transactions`; the two are only ever swapped together.
	pub snapshot: FootprintSnapshot,
	/// Credit token chosen for the next offset, if any.
	pub selected_token: Option<TokenBalance>,
}

impl ViewState {
	fn idle() -> Self {
		Self {
			address: None,
			phase: Phase::Idle,
			transactions: None,
			snapshot: FootprintSnapshot::empty(),
			selected_token: None,
		}
	}
}

/// Atomic holder for the current [`ViewState`].
pub struct StateHolder {
	inner: ArcSwap<ViewState>,
}

impl StateHolder {
	/// Creates a holder in the idle state.
	pub fn new() -> Self {
		Self {
			inner: ArcSwap::from_pointee(ViewState::idle()),
		}
	}

	/// Returns the current snapshot.
	pub fn load(&self) -> Arc<ViewState> {
		self.inner.load_full()
	}

	/// Replaces the loaded batch and its derived footprint in a single
	/// swap, moving to the ready phase.
	pub fn set_batch(
		&self,
		address: Address,
		transactions: Vec<FormattedTransaction>,
		snapshot: FootprintSnapshot,
	) {
		self.update(|state| ViewState {
			address: Some(address),
			phase: Phase::Ready,
			transactions: Some(transactions.clone()),
			snapshot: snapshot.clone(),
			selected_token: state.selected_token.clone(),
		});
	}

	/// Clears any loaded batch and returns to idle. The selected token
	/// is kept; it belongs to the session, not the batch.
	pub fn clear_batch(&self) {
		self.update(|state| ViewState {
			selected_token: state.selected_token.clone(),
			..ViewState::idle()
		});
	}

	/// Records the workflow phase.
	pub fn set_phase(&self, phase: Phase) {
		self.update(|state| {
			let mut next = state.clone();
			next.phase = phase;
			next
		});
	}

	/// Records the token chosen for the next offset.
	pub fn select_token(&self, token: Option<TokenBalance>) {
		self.update(|state| {
			let mut next = state.clone();
			next.selected_token = token.clone();
			next
		});
	}

	fn update(&self, f: impl Fn(&ViewState) -> ViewState) {
		self.inner.rcu(|current| f(current.as_ref()));
	}
}

impl Default for StateHolder {
	fn default() -> Self {
		Self::new()
	}
}
