//! String formatting utilities.
//!
//! Provides functions for formatting hashes and hex strings for
//! display, including prefix management and truncation for
//! readability.

/// Truncates a hash or address for display purposes.
///
/// Shows only the first 15 characters followed by "..." for longer
/// strings, matching the way transaction hashes are listed.
pub fn truncate_id(id: &str) -> String {
	// Cut on a character boundary; provider-supplied strings are not
	// guaranteed to be ASCII.
	match id.char_indices().nth(15) {
		Some((boundary, _)) => format!("{}...", &id[..boundary]),
		None => id.to_string(),
	}
}

/// Adds "0x" prefix to a hex string if it doesn't already have one.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.to_lowercase().starts_with("0x") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Removes "0x" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_truncate_id() {
		assert_eq!(truncate_id("0x1234567890ab"), "0x1234567890ab");
		assert_eq!(
			truncate_id("0x8a1f5e2cbb04e9d1ffab33c5d28b6a49d7e2c90b"),
			"0x8a1f5e2cbb04e..."
		);
	}

	#[test]
	fn test_truncate_id_multibyte_input() {
		// 16 two-byte characters; the cut must land on a character
		// boundary, not byte 15.
		let id = "éééééééééééééééé";
		assert_eq!(truncate_id(id), "ééééééééééééééé...");
		assert_eq!(truncate_id("ééé"), "ééé");
	}

	#[test]
	fn test_with_0x_prefix() {
		assert_eq!(
			with_0x_prefix("5fbdb2315678afecb367f032d93f642f64180aa3"),
			"0x5fbdb2315678afecb367f032d93f642f64180aa3"
		);
		assert_eq!(
			with_0x_prefix("0x5fbdb2315678afecb367f032d93f642f64180aa3"),
			"0x5fbdb2315678afecb367f032d93f642f64180aa3"
		);
	}

	#[test]
	fn test_without_0x_prefix() {
		assert_eq!(
			without_0x_prefix("0x5fbdb2315678afecb367f032d93f642f64180aa3"),
			"5fbdb2315678afecb367f032d93f642f64180aa3"
		);
		assert_eq!(
			without_0x_prefix("5fbdb2315678afecb367f032d93f642f64180aa3"),
			"5fbdb2315678afecb367f032d93f642f64180aa3"
		);
		assert_eq!(
			without_0x_prefix("0X5fbdb2315678afecb367f032d93f642f64180aa3"),
			"5fbdb2315678afecb367f032d93f642f64180aa3"
		);
	}
}
