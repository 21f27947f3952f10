//! Configuration module for the offsetter system.
//!
//! This module provides structures and utilities for managing the
//! workflow configuration. It supports loading configuration from TOML
//! files with `${VAR}` environment-variable resolution and validates
//! that all required values are properly set before any service is
//! constructed.

use alloy_primitives::Address;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the offsetter.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Chain and RPC settings.
	pub network: NetworkConfig,
	/// Transaction history provider settings.
	pub history: HistoryConfig,
	/// Credit tokens the wallet may hold deposits of.
	pub tokens: Vec<TokenConfig>,
	/// Workflow tunables for the offset submission path.
	#[serde(default)]
	pub workflow: WorkflowConfig,
}

/// Chain and RPC settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
	/// Chain ID the settlement contract lives on.
	pub chain_id: u64,
	/// HTTP RPC endpoint.
	pub rpc_url: String,
	/// Address of the settlement (offsetter) contract.
	pub contract_address: Address,
}

/// Transaction history provider settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryConfig {
	/// Base URL of the scan-style explorer API.
	pub api_url: String,
	/// Optional API key appended to explorer requests.
	#[serde(default)]
	pub api_key: Option<String>,
	/// Maximum records the provider returns in one batch. The explorer
	/// silently truncates older history beyond this; footprint figures
	/// for capped batches are lower bounds.
	#[serde(default = "default_max_records")]
	pub max_records: usize,
}

/// Returns the documented explorer record cap.
fn default_max_records() -> usize {
	10_000
}

/// A credit token known to the deployment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
	/// Token contract address.
	pub address: Address,
	/// Token symbol.
	pub symbol: String,
	/// Base-unit scale of the token.
	pub decimals: u8,
}

/// Workflow tunables for the offset submission path.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
	/// Symbol of the pooled reserve token, which is never directly
	/// spendable as an offset instrument.
	#[serde(default = "default_reserve_symbol")]
	pub reserve_symbol: String,
	/// Seconds to wait for on-chain confirmation before surfacing a
	/// timeout instead of hanging indefinitely.
	#[serde(default = "default_confirmation_timeout_secs")]
	pub confirmation_timeout_secs: u64,
	/// Seconds between receipt polls while confirming.
	#[serde(default = "default_poll_interval_secs")]
	pub poll_interval_secs: u64,
}

impl Default for WorkflowConfig {
	fn default() -> Self {
		Self {
			reserve_symbol: default_reserve_symbol(),
			confirmation_timeout_secs: default_confirmation_timeout_secs(),
			poll_interval_secs: default_poll_interval_secs(),
		}
	}
}

/// Returns the default reserve token symbol.
fn default_reserve_symbol() -> String {
	"BCT".to_string()
}

/// Returns the default confirmation timeout in seconds.
fn default_confirmation_timeout_secs() -> u64 {
	600
}

/// Returns the default receipt poll interval in seconds.
fn default_poll_interval_secs() -> u64 {
	3
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable
/// VAR_NAME. Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let contents = tokio::fs::read_to_string(path).await?;
		contents.parse()
	}

	/// Validates the configuration to ensure all required fields are
	/// properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.network.rpc_url.is_empty() {
			return Err(ConfigError::Validation("RPC URL cannot be empty".into()));
		}
		if self.network.contract_address == Address::ZERO {
			return Err(ConfigError::Validation(
				"Settlement contract address cannot be the zero address".into(),
			));
		}

		if self.history.api_url.is_empty() {
			return Err(ConfigError::Validation(
				"History API URL cannot be empty".into(),
			));
		}
		if self.history.max_records == 0 {
			return Err(ConfigError::Validation(
				"history.max_records must be greater than 0".into(),
			));
		}

		if self.tokens.is_empty() {
			return Err(ConfigError::Validation(
				"At least one credit token must be configured".into(),
			));
		}
		for token in &self.tokens {
			if token.symbol.is_empty() {
				return Err(ConfigError::Validation(format!(
					"Token {} must have a symbol",
					token.address
				)));
			}
			// 10^78 no longer fits a 256-bit amount.
			if token.decimals > 77 {
				return Err(ConfigError::Validation(format!(
					"Token {} decimals ({}) exceed the supported scale of 77",
					token.address, token.decimals
				)));
			}
		}

		if self.workflow.reserve_symbol.is_empty() {
			return Err(ConfigError::Validation(
				"workflow.reserve_symbol cannot be empty".into(),
			));
		}
		if self.workflow.confirmation_timeout_secs == 0 {
			return Err(ConfigError::Validation(
				"workflow.confirmation_timeout_secs must be greater than 0".into(),
			));
		}
		if self.workflow.poll_interval_secs == 0 {
			return Err(ConfigError::Validation(
				"workflow.poll_interval_secs must be greater than 0".into(),
			));
		}
		if self.workflow.poll_interval_secs > self.workflow.confirmation_timeout_secs {
			return Err(ConfigError::Validation(
				"workflow.poll_interval_secs cannot exceed the confirmation timeout".into(),
			));
		}

		Ok(())
	}

	/// Looks up the configured decimals for a token address.
	pub fn token_decimals(&self, address: &Address) -> Option<u8> {
		self.tokens
			.iter()
			.find(|t| t.address == *address)
			.map(|t| t.decimals)
	}
}

/// Implementation of FromStr for Config to enable parsing from string.
///
/// Environment variables are resolved and the configuration is
/// automatically validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
