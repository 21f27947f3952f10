//! The transaction formatter.
//!
//! Normalizes raw provider records into [`FormattedTransaction`]
//! values: numeric coercions and status mapping. Pure and total over
//! valid input, resilient to individual bad records.

use offset_types::{truncate_id, FormattedTransaction, RawTransaction, TxStatus};

/// Normalizes a batch of raw provider records.
///
/// Preserves input order. A record lacking a hash, or with a
/// non-numeric gas or nonce field, is dropped with a logged warning
/// rather than aborting the whole batch.
pub fn format_transactions(raw: Vec<RawTransaction>) -> Vec<FormattedTransaction> {
	raw.into_iter()
		.filter_map(|record| match format_record(record) {
			Ok(tx) => Some(tx),
			Err(reason) => {
				tracing::warn!(reason = %reason, "Dropping malformed history record");
				None
			},
		})
		.collect()
}

/// Normalizes a single record, or explains why it is malformed.
fn format_record(record: RawTransaction) -> Result<FormattedTransaction, String> {
	let hash = record.hash.ok_or_else(|| "record has no hash".to_string())?;

	let gas_used = record.gas_used.parse::<u64>().map_err(|_| {
		format!(
			"non-numeric gas field '{}' in {}",
			record.gas_used,
			truncate_id(&hash)
		)
	})?;

	let nonce = record.nonce.parse::<u64>().map_err(|_| {
		format!(
			"non-numeric nonce '{}' in {}",
			record.nonce,
			truncate_id(&hash)
		)
	})?;

	let status = if record.status == "1" {
		TxStatus::Success
	} else {
		TxStatus::Failure
	};

	Ok(FormattedTransaction {
		hash,
		gas_used,
		nonce,
		status,
		offset: record.offset,
	})
}
