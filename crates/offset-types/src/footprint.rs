//! Footprint metrics derived from a batch of formatted transactions.
//!
//! A snapshot is always rebuilt from the freshest provider data and
//! never incrementally patched, so the locally held offset status
//! cannot drift from on-chain truth between fetches.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Estimated footprint per transaction, in kilograms of CO2.
///
/// A documented approximation (0.00036 kg, equivalently 3.6e-7 tonnes
/// per transaction), not a metered figure.
pub const EMISSIONS_PER_TX_KG: Decimal = Decimal::from_parts(36, 0, 0, false, 5);

/// Kilograms per tonne.
pub const KG_PER_TONNE: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Decimal places kept when rounding the tonne figure.
pub const TONNES_SCALE: u32 = 8;

/// Derived footprint metrics for one fetched transaction batch.
///
/// Never persisted; recomputed on every fetch and after every offset
/// attempt regardless of outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootprintSnapshot {
	/// Sum of gas used over all transactions, offset or not.
	pub overall_gas_used: u64,
	/// Outstanding emissions in kilograms: unoffset count x 0.00036.
	pub overall_emissions_kg: Decimal,
	/// Outstanding emissions in tonnes, rounded to 8 decimal places.
	pub overall_emissions_tonnes: Decimal,
}

impl FootprintSnapshot {
	/// Snapshot for an empty batch: zero gas, zero emissions.
	pub fn empty() -> Self {
		Self {
			overall_gas_used: 0,
			overall_emissions_kg: Decimal::ZERO,
			overall_emissions_tonnes: Decimal::ZERO,
		}
	}

	/// Whether any footprint remains to be offset.
	pub fn has_outstanding(&self) -> bool {
		!self.overall_emissions_tonnes.is_zero()
	}

	/// Full-precision textual rendering of the tonne figure.
	///
	/// Uses the complete decimal expansion, so values as small as
	/// 3.6e-7 tonnes render as "0.00000036" rather than collapsing
	/// under a fixed-width cut.
	pub fn display_tonnes(&self) -> String {
		self.overall_emissions_tonnes.normalize().to_string()
	}
}
