//! Main entry point for the offsetter CLI.
//!
//! This binary inspects the transaction history of an address, derives
//! its outstanding carbon footprint, and can settle that footprint by
//! spending a deposited credit token through the settlement contract.

use clap::{Parser, Subcommand};
use offset_config::Config;
use offset_core::{compute_footprint, OffsetEngine, TracingNotifier};
use offset_history::HistoryService;
use offset_session::SessionService;
use offset_settlement::SettlementService;
use offset_types::{truncate_id, FootprintSnapshot, FormattedTransaction};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use offset_history::implementations::scan_api::ScanApiHistory;
use offset_session::implementations::local::LocalSession;
use offset_settlement::implementations::evm::EvmSettlement;

/// Command-line arguments for the offsetter CLI.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Fetch an address's transaction history and show its footprint.
	Fetch {
		/// Address to inspect
		address: Address,
	},
	/// Offset an address's outstanding footprint with a credit token.
	Offset {
		/// Address whose footprint to settle
		address: Address,

		/// Address of the credit token to spend
		#[arg(short, long)]
		token: Address,

		/// Private key used to sign the settlement transaction
		#[arg(long, env = "OFFSETTER_PRIVATE_KEY", hide_env_values = true)]
		private_key: String,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt().with_env_filter(env_filter).with_target(true).init();

	let config = Config::from_file(&args.config.to_string_lossy()).await?;
	tracing::info!(chain_id = config.network.chain_id, "Loaded configuration");

	match args.command {
		Command::Fetch { address } => fetch(&config, address).await,
		Command::Offset {
			address,
			token,
			private_key,
		} => offset(&config, address, token, &private_key).await,
	}
}

/// Builds the history service from configuration.
fn build_history(config: &Config) -> Result<HistoryService, Box<dyn std::error::Error>> {
	let implementation = ScanApiHistory::new(
		config.history.api_url.clone(),
		config.history.api_key.clone(),
		config.history.max_records,
		&config.network.rpc_url,
		config.network.contract_address,
	)?;
	Ok(HistoryService::new(Box::new(implementation)))
}

/// Fetches the history of an address and prints it with its footprint.
async fn fetch(config: &Config, address: Address) -> Result<(), Box<dyn std::error::Error>> {
	let history = build_history(config)?;
	let transactions = history.fetch_formatted(address).await?;
	let snapshot = compute_footprint(&transactions);

	render_table(&transactions);
	render_stats(&snapshot);
	Ok(())
}

/// Runs the full offset workflow for an address.
async fn offset(
	config: &Config,
	address: Address,
	token: Address,
	private_key: &str,
) -> Result<(), Box<dyn std::error::Error>> {
	let history = build_history(config)?;
	let session = SessionService::new(Box::new(LocalSession::new(
		Some(private_key),
		&config.network.rpc_url,
		config.network.contract_address,
		config.tokens.clone(),
	)?));
	let signer: PrivateKeySigner = private_key.parse()?;
	let settlement = SettlementService::new(
		Box::new(EvmSettlement::new(
			&config.network.rpc_url,
			config.network.chain_id,
			config.network.contract_address,
			signer,
			Duration::from_secs(config.workflow.poll_interval_secs),
		)?),
		Duration::from_secs(config.workflow.confirmation_timeout_secs),
	);

	let engine = OffsetEngine::new(
		history,
		session,
		settlement,
		Arc::new(TracingNotifier),
		config.workflow.reserve_symbol.clone(),
	);

	engine.load_transactions(address).await?;

	let state = engine.state();
	render_stats(&state.snapshot);
	if !state.snapshot.has_outstanding() {
		tracing::info!(%address, "Nothing left to offset");
		return Ok(());
	}

	let eligible = engine.eligible_tokens().await?;
	let chosen = eligible
		.into_iter()
		.find(|t| t.address == token)
		.ok_or("The requested token is not eligible to cover this footprint")?;
	tracing::info!(token = %chosen.symbol, balance = %chosen.balance, "Selected credit token");
	engine.select_token(Some(chosen));

	engine.submit_offset().await?;

	let state = engine.state();
	if let Some(transactions) = &state.transactions {
		render_table(transactions);
	}
	render_stats(&state.snapshot);
	Ok(())
}

/// Prints the transaction batch as a table.
fn render_table(transactions: &[FormattedTransaction]) {
	if transactions.is_empty() {
		println!("No transactions found.");
		return;
	}

	println!(
		"{:<20} {:>12} {:>8} {:>9} {:>7}",
		"hash", "gas used", "nonce", "status", "offset"
	);
	for tx in transactions {
		println!(
			"{:<20} {:>12} {:>8} {:>9} {:>7}",
			truncate_id(&tx.hash),
			tx.gas_used,
			tx.nonce,
			tx.status.to_string(),
			if tx.offset { "yes" } else { "no" }
		);
	}
}

/// Prints the derived footprint figures.
fn render_stats(snapshot: &FootprintSnapshot) {
	println!("overall gas used:      {}", snapshot.overall_gas_used);
	println!(
		"outstanding emissions: {} kg ({} t)",
		snapshot.overall_emissions_kg.normalize(),
		snapshot.display_tonnes()
	);
}
