//! Core workflow module for the offsetter system.
//!
//! This module contains the domain logic of the offset workflow: the
//! footprint calculator, the credit token eligibility filter, the
//! atomic view-state holder, the user notification boundary and the
//! orchestrator that drives fetch, submission and reconciliation over
//! the injected history, session and settlement services.

/// Credit token eligibility filtering.
pub mod eligibility;
/// The workflow orchestrator.
pub mod engine;
/// Footprint calculation.
pub mod footprint;
/// User notification boundary.
pub mod notify;
/// Atomic view state.
pub mod state;

pub use eligibility::eligible_tokens;
pub use engine::{OffsetEngine, OffsetError};
pub use footprint::compute_footprint;
pub use notify::{Notifier, TracingNotifier};
pub use state::{Phase, StateHolder, ViewState};
