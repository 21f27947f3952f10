//! Utility functions for common conversions and display formatting.

/// Decimal/base-unit conversions with per-token scale.
pub mod conversion;
/// Display helpers for hashes and hex strings.
pub mod formatting;

pub use conversion::{from_base_units, to_base_units, ConversionError};
pub use formatting::{truncate_id, with_0x_prefix, without_0x_prefix};
