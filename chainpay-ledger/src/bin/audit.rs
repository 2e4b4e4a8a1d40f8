//! Offline ledger auditor
//!
//! Loads the configured snapshot, re-derives the full hash chain, and prints
//! a JSON report of what it found. Exits non-zero if the chain is broken.
//!
//! Usage: `ledger-audit [config.toml]` (falls back to environment variables).

use anyhow::Context;
use chainpay_ledger::{Config, Ledger};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path).with_context(|| format!("loading {path}"))?,
        None => Config::from_env().context("loading config from environment")?,
    };

    let snapshot_path = config.snapshot_path();
    tracing::info!(path = ?snapshot_path, "auditing ledger snapshot");

    let ledger = Ledger::open(config).context("opening ledger")?;

    let chain_result = ledger.verify_chain();
    let chain_ok = chain_result.is_ok();
    if let Err(ref err) = chain_result {
        tracing::error!(%err, "hash chain verification failed");
    }

    let report = serde_json::json!({
        "snapshot": snapshot_path,
        "accounts": ledger.state().registry.len(),
        "transactions": ledger.transaction_count(),
        "total_balance": ledger.total_balance().to_string(),
        "next_auto_id": ledger.state().next_auto_id.to_string(),
        "chain_ok": chain_ok,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    chain_result.context("hash chain verification")?;
    Ok(())
}
