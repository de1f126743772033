//! iperf3 process control inside network namespaces.
//!
//! Both roles are launched as `ip netns exec <ns> iperf3 ...`. Spawn
//! failures are fatal: without a live process there is nothing to measure.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::config::REPORT_INTERVAL_SECS;

const IP: &str = "ip";
const IPERF3: &str = "iperf3";

/// Spawns iperf3 server and client processes.
///
/// The namespace-entry binary is a field so tests can substitute a stub
/// script for `ip`.
#[derive(Debug, Clone)]
pub struct IperfRunner {
    ip_binary: String,
}

impl Default for IperfRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl IperfRunner {
    pub fn new() -> Self {
        Self {
            ip_binary: IP.to_string(),
        }
    }

    /// Use a different namespace-entry binary (tests only, in practice).
    pub fn with_ip_binary(ip_binary: impl Into<String>) -> Self {
        Self {
            ip_binary: ip_binary.into(),
        }
    }

    /// Launch an iperf3 server in listen mode inside `namespace`.
    ///
    /// Does not block; the returned guard terminates the server when asked
    /// to, or on drop if nothing asked first.
    pub fn start_server(&self, namespace: &str) -> Result<ServerGuard> {
        let child = Command::new(&self.ip_binary)
            .args(["netns", "exec", namespace, IPERF3, "-s"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to start iperf3 server in namespace {namespace}"))?;

        debug!(namespace, pid = child.id(), "iperf3 server started");
        Ok(ServerGuard {
            child,
            namespace: namespace.to_string(),
            terminated: false,
        })
    }

    /// Launch a timed iperf3 client against `target_addr` inside
    /// `namespace`, streaming JSON output.
    ///
    /// Does not block; the caller waits for the configured duration and
    /// then consumes the child's output.
    pub fn run_client(
        &self,
        target_addr: &str,
        duration_secs: u64,
        namespace: &str,
    ) -> Result<Child> {
        let child = Command::new(&self.ip_binary)
            .args([
                "netns",
                "exec",
                namespace,
                IPERF3,
                "-c",
                target_addr,
                "-t",
                &duration_secs.to_string(),
                "-i",
                &REPORT_INTERVAL_SECS.to_string(),
                "--json",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| {
                format!("failed to start iperf3 client against {target_addr} in namespace {namespace}")
            })?;

        debug!(namespace, target_addr, pid = child.id(), "iperf3 client started");
        Ok(child)
    }
}

/// Scoped handle to a background iperf3 server.
///
/// Termination happens on every exit path: explicitly via [`terminate`],
/// or on drop for early-error paths that never reach the explicit call.
/// The signal is sent at most once.
///
/// [`terminate`]: ServerGuard::terminate
#[derive(Debug)]
pub struct ServerGuard {
    child: Child,
    namespace: String,
    terminated: bool,
}

impl ServerGuard {
    /// Request server termination. Idempotent and infallible for the
    /// caller: a failure (e.g. the process already exited) is logged and
    /// swallowed so cleanup never blocks the rest of the run.
    pub fn terminate(&mut self) {
        if self.terminated {
            return;
        }
        self.terminated = true;

        match self.child.start_kill() {
            Ok(()) => debug!(namespace = %self.namespace, "iperf3 server terminated"),
            Err(e) => warn!(
                namespace = %self.namespace,
                "failed to terminate iperf3 server: {e}"
            ),
        }
    }

    /// Whether termination has been requested.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Write a stub `ip` that ignores the namespace arguments, sleeps in
    /// server mode, and prints canned JSON in client mode.
    pub(crate) fn write_stub_ip(dir: &TempDir, client_output: &str) -> PathBuf {
        let path = dir.path().join("ip");
        let script = format!(
            r#"#!/bin/sh
# args: netns exec <ns> iperf3 ...
shift 4
for arg in "$@"; do
    if [ "$arg" = "-s" ]; then
        exec sleep 60
    fi
done
cat <<'EOF'
{client_output}
EOF
"#
        );
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(script.as_bytes()).unwrap();
        let mut perms = file.metadata().unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[tokio::test]
    async fn test_spawn_failure_is_fatal() {
        let runner = IperfRunner::with_ip_binary("/nonexistent/ip");
        assert!(runner.start_server("ns1").is_err());
        assert!(runner.run_client("10.0.0.2", 5, "ns1").is_err());
    }

    #[tokio::test]
    async fn test_server_guard_terminate_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let stub = write_stub_ip(&dir, "{}");
        let runner = IperfRunner::with_ip_binary(stub.to_str().unwrap());

        let mut guard = runner.start_server("ns1").unwrap();
        assert!(!guard.is_terminated());

        guard.terminate();
        assert!(guard.is_terminated());

        // Second call must be a no-op, not an error or a panic.
        guard.terminate();
        assert!(guard.is_terminated());
    }

    #[tokio::test]
    async fn test_client_streams_output() {
        let dir = TempDir::new().unwrap();
        let stub = write_stub_ip(&dir, r#"{"intervals": []}"#);
        let runner = IperfRunner::with_ip_binary(stub.to_str().unwrap());

        let client = runner.run_client("10.0.0.2", 1, "ns1").unwrap();
        let output = client.wait_with_output().await.unwrap();
        assert!(output.status.success());
        let raw = String::from_utf8(output.stdout).unwrap();
        assert!(raw.contains("intervals"));
    }
}
