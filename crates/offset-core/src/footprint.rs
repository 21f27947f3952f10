//! Footprint calculation over a formatted transaction batch.

use offset_types::{
	FootprintSnapshot, FormattedTransaction, EMISSIONS_PER_TX_KG, KG_PER_TONNE, TONNES_SCALE,
};
use rust_decimal::Decimal;

/// Computes the footprint snapshot for a transaction batch.
///
/// Gas is summed over every record regardless of offset status; only
/// records not yet offset contribute emissions. The tonne figure is
/// the kilogram figure divided by 1000, rounded to eight decimal
/// places. Pure over its input: the same batch always yields the same
/// snapshot.
pub fn compute_footprint(transactions: &[FormattedTransaction]) -> FootprintSnapshot {
	if transactions.is_empty() {
		return FootprintSnapshot::empty();
	}

	let overall_gas_used = transactions
		.iter()
		.fold(0u64, |acc, tx| acc.saturating_add(tx.gas_used));

	let unoffset_count = transactions.iter().filter(|tx| !tx.offset).count();
	let overall_emissions_kg = Decimal::from(unoffset_count as u64) * EMISSIONS_PER_TX_KG;
	let overall_emissions_tonnes = (overall_emissions_kg / KG_PER_TONNE).round_dp(TONNES_SCALE);

	FootprintSnapshot {
		overall_gas_used,
		overall_emissions_kg,
		overall_emissions_tonnes,
	}
}
