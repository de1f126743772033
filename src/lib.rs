//! # linkbench
//!
//! A benchmarking harness that compares network throughput across an
//! encrypted (MACsec) link and a plain link. It drives `iperf3` inside two
//! isolated network namespaces, decodes the streaming JSON telemetry, and
//! renders a comparative log-scale chart in the terminal.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Orchestrator (session)                  │
//! │                                                              │
//! │  ┌────────┐ spawn  ┌───────────┐ decode ┌───────┐  render    │
//! │  │ runner │───────▶│ telemetry │───────▶│ chart │──────────▶ │
//! │  └────────┘        └───────────┘        └───┬───┘  Terminal  │
//! │       ▲                                     │                │
//! │       │ ip netns exec <ns> iperf3 ...       │ stats          │
//! │                                             ▼                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`config`]**: validated benchmark configuration (addresses,
//!   namespaces, duration); fails fast before anything is spawned
//! - **[`runner`]**: iperf3 process control with a scoped server guard
//! - **[`telemetry`]**: tolerant decoding of iperf3 JSON into throughput
//!   samples
//! - **[`stats`]**: per-series min/max/mean and log-axis math
//! - **[`chart`]**: pure chart model plus the one-shot terminal render
//! - **[`session`]**: the per-session state machine and the sequential
//!   two-session comparison
//!
//! The two sessions never run concurrently: they would share the physical
//! link and corrupt the comparison.
//!
//! ## Usage
//!
//! ```bash
//! linkbench \
//!     --secure-addr 10.1.0.2 --secure-server-ns macsec1 --secure-client-ns macsec0 \
//!     --plain-addr 10.2.0.2 --plain-server-ns plain1 --plain-client-ns plain0 \
//!     --duration 10
//! ```
//!
//! Namespaces, bridges, and the MACsec configuration itself are expected
//! to exist already; the harness only consumes them through `ip netns
//! exec`.

pub mod chart;
pub mod config;
pub mod runner;
pub mod session;
pub mod stats;
pub mod telemetry;

// Re-export main types for convenience
pub use chart::ChartModel;
pub use config::{BenchConfig, SessionSpec};
pub use runner::{IperfRunner, ServerGuard};
pub use session::{ComparisonOutcome, Orchestrator, SessionPhase, SessionReport};
pub use stats::SeriesStats;
pub use telemetry::IntervalSample;
