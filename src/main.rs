use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use linkbench::{
    chart, BenchConfig, ComparisonOutcome, IperfRunner, Orchestrator, SessionSpec,
};

#[derive(Parser, Debug)]
#[command(name = "linkbench")]
#[command(about = "Compare MACsec-encrypted and plain link throughput with iperf3")]
struct Args {
    /// iperf3 server address for the encrypted (MACsec) link
    #[arg(long)]
    secure_addr: String,

    /// Namespace hosting the iperf3 server for the encrypted link
    #[arg(long)]
    secure_server_ns: String,

    /// Namespace running the iperf3 client for the encrypted link
    #[arg(long)]
    secure_client_ns: String,

    /// iperf3 server address for the plain link
    #[arg(long)]
    plain_addr: String,

    /// Namespace hosting the iperf3 server for the plain link
    #[arg(long)]
    plain_server_ns: String,

    /// Namespace running the iperf3 client for the plain link
    #[arg(long)]
    plain_client_ns: String,

    /// Test duration in seconds; prompted for interactively when omitted
    #[arg(short, long)]
    duration: Option<u64>,
}

fn init_logging() {
    // Progress feedback goes through tracing; default to info so the
    // per-second ticks are visible without RUST_LOG set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(filter))
        .init();
}

/// One console prompt for the run duration, used when --duration is
/// absent.
fn prompt_duration() -> Result<u64> {
    print!("Enter the duration of the iperf test in seconds: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read duration from stdin")?;

    let duration: u64 = line
        .trim()
        .parse()
        .context("duration must be a positive integer")?;
    if duration == 0 {
        bail!("duration must be a positive integer");
    }
    Ok(duration)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let duration_secs = match args.duration {
        Some(duration) => duration,
        None => prompt_duration()?,
    };

    let cfg = BenchConfig {
        secure: SessionSpec {
            label: "MACsec".to_string(),
            target_addr: args.secure_addr,
            server_namespace: args.secure_server_ns,
            client_namespace: args.secure_client_ns,
        },
        plain: SessionSpec {
            label: "Plain".to_string(),
            target_addr: args.plain_addr,
            server_namespace: args.plain_server_ns,
            client_namespace: args.plain_client_ns,
        },
        duration_secs,
    };
    cfg.validate()?;

    let orchestrator = Orchestrator::new(IperfRunner::new());
    match orchestrator.run(&cfg).await? {
        ComparisonOutcome::Chart(model) => chart::render(&model)?,
        ComparisonOutcome::NoData { empty_sessions } => {
            println!(
                "No data received for: {}. Check if the iperf3 server is running properly.",
                empty_sessions.join(", ")
            );
        }
    }

    Ok(())
}
