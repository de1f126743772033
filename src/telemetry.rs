//! Decoding of iperf3 JSON telemetry.
//!
//! These types match the document iperf3 emits with `--json`: one top-level
//! object holding an `intervals` array, each element carrying a `sum`
//! aggregate that normally includes `bits_per_second`. Only the fields the
//! harness consumes are modeled; everything else is ignored by serde.
//!
//! Decoding is tolerant by design: a malformed or empty document yields an
//! empty sample list and a logged diagnostic, never an error. A run with no
//! usable data is a reportable condition, not a crash.

use serde::Deserialize;
use tokio::process::Child;
use tracing::warn;

/// Top-level iperf3 JSON report.
#[derive(Debug, Clone, Deserialize)]
pub struct IperfReport {
    #[serde(default)]
    pub intervals: Vec<IntervalRecord>,
    /// Set by iperf3 when the run itself failed (e.g. connection refused).
    #[serde(default)]
    pub error: Option<String>,
}

/// One periodic measurement unit covering a sub-interval of the run.
#[derive(Debug, Clone, Deserialize)]
pub struct IntervalRecord {
    #[serde(default)]
    pub sum: Option<IntervalSum>,
}

/// Aggregate over all streams for one interval.
#[derive(Debug, Clone, Deserialize)]
pub struct IntervalSum {
    #[serde(default)]
    pub bits_per_second: Option<f64>,
}

/// A single derived throughput data point.
///
/// Indices are 1-based and assigned in emission order: intervals lacking a
/// throughput value are skipped and do not consume an index slot, so
/// indices are always dense over the emitted samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalSample {
    pub index: usize,
    /// Throughput in Gbit/s (`bits_per_second / 1e9`).
    pub gbps: f64,
}

/// Decode a captured iperf3 JSON document into throughput samples.
///
/// Returns an empty vec on any decode failure.
pub fn decode_report(raw: &str) -> Vec<IntervalSample> {
    let report: IperfReport = match serde_json::from_str(raw) {
        Ok(report) => report,
        Err(e) => {
            warn!("failed to decode iperf3 output as JSON: {e}");
            return Vec::new();
        }
    };

    if let Some(error) = &report.error {
        warn!("iperf3 reported an error: {error}");
    }

    let mut samples = Vec::new();
    for record in report.intervals {
        let Some(bps) = record.sum.and_then(|sum| sum.bits_per_second) else {
            continue;
        };
        samples.push(IntervalSample {
            index: samples.len() + 1,
            gbps: bps / 1e9,
        });
    }
    samples
}

/// Wait for the iperf3 client to finish and decode everything it printed.
///
/// Blocks until the client's output stream reaches end-of-file, i.e. until
/// the process exits. Read failures and non-zero exits are logged and
/// treated as "no data" so the server can still be torn down and the other
/// session can still run.
pub async fn parse_client_output(client: Child) -> Vec<IntervalSample> {
    let output = match client.wait_with_output().await {
        Ok(output) => output,
        Err(e) => {
            warn!("failed to collect iperf3 client output: {e}");
            return Vec::new();
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(
            status = %output.status,
            "iperf3 client exited with failure: {}",
            stderr.trim()
        );
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    decode_report(&raw)
}
