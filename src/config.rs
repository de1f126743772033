//! Benchmark configuration.
//!
//! One [`SessionSpec`] per link under test, with one consistently named
//! field per role (target address, server namespace, client namespace).
//! Validation runs before any process is spawned so that a half-configured
//! run can never leave an iperf3 server behind.

use anyhow::{bail, Result};

/// How long the orchestrator waits after starting a server before the
/// client connects, so the server has time to bind its listen socket.
pub const WARM_UP_SECS: u64 = 1;

/// iperf3 reporting interval in seconds. Fixed: the comparison assumes
/// one sample per second on both links.
pub const REPORT_INTERVAL_SECS: u64 = 1;

/// Identifies one measurement session: which address to drive traffic at,
/// and which namespaces host each end of the link.
#[derive(Debug, Clone)]
pub struct SessionSpec {
    /// Display label, e.g. "MACsec" or "Plain".
    pub label: String,
    /// IP address the iperf3 client connects to.
    pub target_addr: String,
    /// Namespace hosting the iperf3 server.
    pub server_namespace: String,
    /// Namespace the iperf3 client runs in.
    pub client_namespace: String,
}

impl SessionSpec {
    fn validate(&self) -> Result<()> {
        if self.label.is_empty() {
            bail!("session label must not be empty");
        }
        if self.target_addr.is_empty() {
            bail!("{}: target address must not be empty", self.label);
        }
        if self.server_namespace.is_empty() {
            bail!("{}: server namespace must not be empty", self.label);
        }
        if self.client_namespace.is_empty() {
            bail!("{}: client namespace must not be empty", self.label);
        }
        Ok(())
    }
}

/// Full benchmark configuration: the two sessions plus the shared run
/// duration.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// The encrypted (MACsec) session. Always runs first.
    pub secure: SessionSpec,
    /// The unencrypted session.
    pub plain: SessionSpec,
    /// Client run duration in seconds.
    pub duration_secs: u64,
}

impl BenchConfig {
    /// Fail fast on missing identifiers or a zero duration.
    pub fn validate(&self) -> Result<()> {
        self.secure.validate()?;
        self.plain.validate()?;
        if self.duration_secs == 0 {
            bail!("test duration must be a positive number of seconds");
        }
        Ok(())
    }
}
