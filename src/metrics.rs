/// Metrics Module - Prometheus Instrumentation
///
/// - Upstream (LCD / rewards API) traffic and latency
/// - Transactions fetched per chain
/// - Report outcomes and build latency
///
/// Label values are bounded: `endpoint` is one of txs/balances/rewards,
/// `chain` comes from the configured registry, `outcome` from fixed strings.

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use lazy_static::lazy_static;
use once_cell::sync::OnceCell;
use std::time::Instant;

/// Upstream calls are slow and paced, so the buckets reach further than usual
const LATENCY_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];
const REPORT_BUCKETS: &[f64] = &[0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0];

static METRICS_INIT: OnceCell<()> = OnceCell::new();

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    /// Labels: endpoint (txs, balances, rewards), outcome (ok, transport, status, decode, ...)
    pub static ref UPSTREAM_REQUESTS: IntCounterVec = IntCounterVec::new(
        Opts::new("observatory_upstream_requests_total", "Upstream REST requests by endpoint and outcome"),
        &["endpoint", "outcome"]
    ).unwrap();

    pub static ref UPSTREAM_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new("observatory_upstream_request_duration_seconds", "Upstream REST request latency")
            .buckets(LATENCY_BUCKETS.to_vec()),
        &["endpoint"]
    ).unwrap();

    /// Labels: chain
    pub static ref TRANSACTIONS_FETCHED: IntCounterVec = IntCounterVec::new(
        Opts::new("observatory_transactions_fetched_total", "Deduplicated transactions fetched per chain"),
        &["chain"]
    ).unwrap();

    pub static ref UNPARSEABLE_CLAIMS: IntCounter = IntCounter::new(
        "observatory_unparseable_claim_amounts_total",
        "Claim reward amounts that could not be parsed"
    ).unwrap();

    /// Labels: outcome (ok, no_data)
    pub static ref REPORTS_GENERATED: IntCounterVec = IntCounterVec::new(
        Opts::new("observatory_reports_generated_total", "Wallet reports generated by outcome"),
        &["outcome"]
    ).unwrap();

    pub static ref DISQUALIFIED_WALLETS: IntCounter = IntCounter::new(
        "observatory_disqualified_wallets_total",
        "Reports that flagged the wallet as disqualified"
    ).unwrap();

    pub static ref REPORT_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new("observatory_report_duration_seconds", "Time to build one wallet report")
            .buckets(REPORT_BUCKETS.to_vec())
    ).unwrap();
}

/// Register every metric with the global registry.
///
/// Safe to call more than once; only the first call registers.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    METRICS_INIT
        .get_or_try_init(|| {
            REGISTRY.register(Box::new(UPSTREAM_REQUESTS.clone()))?;
            REGISTRY.register(Box::new(UPSTREAM_REQUEST_DURATION.clone()))?;
            REGISTRY.register(Box::new(TRANSACTIONS_FETCHED.clone()))?;
            REGISTRY.register(Box::new(UNPARSEABLE_CLAIMS.clone()))?;
            REGISTRY.register(Box::new(REPORTS_GENERATED.clone()))?;
            REGISTRY.register(Box::new(DISQUALIFIED_WALLETS.clone()))?;
            REGISTRY.register(Box::new(REPORT_DURATION.clone()))?;
            Ok(())
        })
        .map(|_| ())
}

/// Gather metrics in Prometheus text format
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Timer for measuring durations
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn record_upstream_request(endpoint: &str, outcome: &str, duration_secs: f64) {
    UPSTREAM_REQUESTS.with_label_values(&[endpoint, outcome]).inc();
    UPSTREAM_REQUEST_DURATION
        .with_label_values(&[endpoint])
        .observe(duration_secs);
}

pub fn increment_transactions_fetched(chain: &str, count: u64) {
    TRANSACTIONS_FETCHED.with_label_values(&[chain]).inc_by(count);
}

pub fn increment_unparseable_claims() {
    UNPARSEABLE_CLAIMS.inc();
}

pub fn record_report(outcome: &str, disqualified: bool, duration_secs: f64) {
    REPORTS_GENERATED.with_label_values(&[outcome]).inc();
    if disqualified {
        DISQUALIFIED_WALLETS.inc();
    }
    REPORT_DURATION.observe(duration_secs);
}
