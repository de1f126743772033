//! Measurement-session orchestration.
//!
//! Each session walks a fixed phase sequence: start the server, give it a
//! second to bind, run the timed client while ticking progress once per
//! second, decode whatever the client printed, and terminate the server.
//! The encrypted session runs fully to [`SessionPhase::Done`] before the
//! plain session starts; running them together would share the physical
//! link and corrupt the comparison.
//!
//! All waits go through `tokio::time::sleep`, so tests drive the whole
//! sequence on tokio's paused clock without real time passing.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::chart::ChartModel;
use crate::config::{BenchConfig, SessionSpec, WARM_UP_SECS};
use crate::runner::IperfRunner;
use crate::telemetry::{self, IntervalSample};

/// Lifecycle phases of one measurement session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NotStarted,
    ServerStarting,
    WarmUp,
    ClientRunning,
    Parsing,
    Terminating,
    Done,
}

impl SessionPhase {
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::NotStarted => "not started",
            SessionPhase::ServerStarting => "starting server",
            SessionPhase::WarmUp => "warming up",
            SessionPhase::ClientRunning => "client running",
            SessionPhase::Parsing => "parsing",
            SessionPhase::Terminating => "terminating",
            SessionPhase::Done => "done",
        }
    }
}

/// Outcome of one completed session.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub label: String,
    pub samples: Vec<IntervalSample>,
    pub phase: SessionPhase,
    /// Whether server termination was requested (always true once the
    /// session completes, whatever the parse produced).
    pub server_terminated: bool,
}

/// Result of the full two-session comparison.
#[derive(Debug, Clone)]
pub enum ComparisonOutcome {
    /// Both sessions produced data; the chart is ready to render.
    Chart(ChartModel),
    /// At least one session came back empty; names the offenders.
    NoData { empty_sessions: Vec<String> },
}

/// Runs the two measurement sessions sequentially and aggregates the
/// outcome.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    runner: IperfRunner,
}

impl Orchestrator {
    pub fn new(runner: IperfRunner) -> Self {
        Self { runner }
    }

    /// Run the encrypted session to completion, then the plain session,
    /// then either build the chart or report which sessions were empty.
    pub async fn run(&self, cfg: &BenchConfig) -> Result<ComparisonOutcome> {
        cfg.validate()?;

        let secure = self.run_session(&cfg.secure, cfg.duration_secs).await?;
        let plain = self.run_session(&cfg.plain, cfg.duration_secs).await?;

        match ChartModel::build(&secure.label, &secure.samples, &plain.label, &plain.samples) {
            Some(model) => Ok(ComparisonOutcome::Chart(model)),
            None => {
                let empty_sessions = [&secure, &plain]
                    .into_iter()
                    .filter(|report| report.samples.is_empty())
                    .map(|report| report.label.clone())
                    .collect();
                Ok(ComparisonOutcome::NoData { empty_sessions })
            }
        }
    }

    /// Run one full session.
    ///
    /// Spawn failures propagate; everything after a successful client
    /// spawn is recoverable and at worst yields an empty sample list. The
    /// server guard covers the early-error paths, so termination is
    /// requested exactly once no matter where the session ends.
    pub async fn run_session(
        &self,
        spec: &SessionSpec,
        duration_secs: u64,
    ) -> Result<SessionReport> {
        let mut phase = SessionPhase::NotStarted;

        advance(&mut phase, SessionPhase::ServerStarting, &spec.label);
        info!(
            session = %spec.label,
            namespace = %spec.server_namespace,
            "starting iperf3 server"
        );
        let mut server = self.runner.start_server(&spec.server_namespace)?;

        advance(&mut phase, SessionPhase::WarmUp, &spec.label);
        tokio::time::sleep(Duration::from_secs(WARM_UP_SECS)).await;

        advance(&mut phase, SessionPhase::ClientRunning, &spec.label);
        info!(
            session = %spec.label,
            namespace = %spec.client_namespace,
            target = %spec.target_addr,
            duration_secs,
            "running iperf3 client"
        );
        let client =
            self.runner
                .run_client(&spec.target_addr, duration_secs, &spec.client_namespace)?;

        wait_for_run(duration_secs, |tick| {
            info!(session = %spec.label, "progress {tick}/{duration_secs} s");
        })
        .await;

        advance(&mut phase, SessionPhase::Parsing, &spec.label);
        let samples = telemetry::parse_client_output(client).await;
        if samples.is_empty() {
            warn!(session = %spec.label, "session produced no throughput samples");
        }

        advance(&mut phase, SessionPhase::Terminating, &spec.label);
        server.terminate();

        advance(&mut phase, SessionPhase::Done, &spec.label);
        info!(session = %spec.label, samples = samples.len(), "session finished");

        Ok(SessionReport {
            label: spec.label.clone(),
            samples,
            phase,
            server_terminated: server.is_terminated(),
        })
    }
}

fn advance(phase: &mut SessionPhase, next: SessionPhase, session: &str) {
    debug!(session, from = phase.label(), to = next.label(), "phase transition");
    *phase = next;
}

/// Wait out the client run, invoking `on_tick` once per elapsed second.
///
/// The tick count equals the configured duration; ticks are cosmetic
/// feedback, not tied to data arrival.
async fn wait_for_run(duration_secs: u64, mut on_tick: impl FnMut(u64)) {
    for tick in 1..=duration_secs {
        tokio::time::sleep(Duration::from_secs(1)).await;
        on_tick(tick);
    }
}
