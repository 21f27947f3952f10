//! Common types module for the offsetter system.
//!
//! This module defines the core data types and structures shared across
//! the offset workflow: transaction history records, footprint metrics,
//! token balances and the settlement call payload. It provides a
//! centralized location for shared types to ensure consistency across
//! all workflow components.

/// On-chain submission types: transaction hashes and receipts.
pub mod chain;
/// Footprint metrics derived from a transaction batch.
pub mod footprint;
/// The settlement call payload.
pub mod request;
/// Deposited credit token balances.
pub mod token;
/// Transaction history records, raw and formatted.
pub mod transaction;
/// Utility functions for common conversions and display formatting.
pub mod utils;

pub use chain::{TransactionHash, TransactionReceipt};
pub use footprint::{FootprintSnapshot, EMISSIONS_PER_TX_KG, KG_PER_TONNE, TONNES_SCALE};
pub use request::OffsetRequest;
pub use token::TokenBalance;
pub use transaction::{FormattedTransaction, RawTransaction, TxStatus};
pub use utils::{
	from_base_units, to_base_units, truncate_id, with_0x_prefix, without_0x_prefix,
	ConversionError,
};
