//! Metrics collection for observability
//!
//! Prometheus metrics for monitoring the ledger:
//!
//! - `ledger_accounts_total` - Accounts registered
//! - `ledger_transactions_total` - Transactions committed
//! - `ledger_transactions_rejected_total` - Write operations rejected at validation
//! - `ledger_chain_length` - Current transaction log length
//! - `ledger_commit_duration_seconds` - Histogram of commit latencies

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Registry};
use std::sync::Arc;

/// Metrics collector
///
/// Metrics register against an owned registry so independent ledger
/// instances (tests included) never collide on metric names.
#[derive(Clone)]
pub struct Metrics {
    /// Accounts registered
    pub accounts_total: IntCounter,

    /// Transactions committed
    pub transactions_total: IntCounter,

    /// Write operations rejected at validation
    pub transactions_rejected: IntCounter,

    /// Current transaction log length
    pub chain_length: IntGauge,

    /// Commit latency histogram
    pub commit_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let accounts_total =
            IntCounter::new("ledger_accounts_total", "Accounts registered")?;
        registry.register(Box::new(accounts_total.clone()))?;

        let transactions_total =
            IntCounter::new("ledger_transactions_total", "Transactions committed")?;
        registry.register(Box::new(transactions_total.clone()))?;

        let transactions_rejected = IntCounter::new(
            "ledger_transactions_rejected_total",
            "Write operations rejected at validation",
        )?;
        registry.register(Box::new(transactions_rejected.clone()))?;

        let chain_length =
            IntGauge::new("ledger_chain_length", "Current transaction log length")?;
        registry.register(Box::new(chain_length.clone()))?;

        let commit_duration = Histogram::with_opts(
            HistogramOpts::new(
                "ledger_commit_duration_seconds",
                "Histogram of commit latencies",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100]),
        )?;
        registry.register(Box::new(commit_duration.clone()))?;

        Ok(Self {
            accounts_total,
            transactions_total,
            transactions_rejected,
            chain_length,
            commit_duration,
            registry,
        })
    }

    /// Record an account registration
    pub fn record_account_created(&self) {
        self.accounts_total.inc();
    }

    /// Record a committed transaction and the new log length
    pub fn record_transaction_committed(&self, chain_length: u64) {
        self.transactions_total.inc();
        self.chain_length.set(chain_length as i64);
    }

    /// Record a validation rejection
    pub fn record_rejection(&self) {
        self.transactions_rejected.inc();
    }

    /// Record commit duration
    pub fn record_commit_duration(&self, duration_seconds: f64) {
        self.commit_duration.observe(duration_seconds);
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("accounts_total", &self.accounts_total.get())
            .field("transactions_total", &self.transactions_total.get())
            .field("transactions_rejected", &self.transactions_rejected.get())
            .field("chain_length", &self.chain_length.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.accounts_total.get(), 0);
        assert_eq!(metrics.transactions_total.get(), 0);
    }

    #[test]
    fn test_independent_instances() {
        // Two collectors must not collide on metric names.
        let m1 = Metrics::new().unwrap();
        let m2 = Metrics::new().unwrap();
        m1.record_account_created();
        assert_eq!(m1.accounts_total.get(), 1);
        assert_eq!(m2.accounts_total.get(), 0);
    }

    #[test]
    fn test_record_transaction_committed() {
        let metrics = Metrics::new().unwrap();
        metrics.record_transaction_committed(1);
        metrics.record_transaction_committed(2);
        assert_eq!(metrics.transactions_total.get(), 2);
        assert_eq!(metrics.chain_length.get(), 2);
    }

    #[test]
    fn test_record_rejection() {
        let metrics = Metrics::new().unwrap();
        metrics.record_rejection();
        assert_eq!(metrics.transactions_rejected.get(), 1);
    }
}
