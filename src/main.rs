use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use futures::StreamExt;
use tokio::sync::Mutex;

use tcp_probe_rs::output::{ConsoleObserver, JsonLinesObserver, SummaryObserver};
use tcp_probe_rs::ports;
use tcp_probe_rs::scanner::TcpConnectScanner;
use tcp_probe_rs::types::ScanSummary;

/// tcp-probe-rs — sequential TCP connect scanner with pluggable result observers.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tcp-probe-rs",
    version,
    about = "Sequential TCP connect scanner with pluggable result observers.",
    long_about = None
)]
struct Cli {
    /// Target host name or address to probe.
    target: String,

    /// Comma separated ports or ranges (e.g. 22,80,8000-8010). Defaults to a common list.
    #[arg(long)]
    ports: Option<String>,

    /// Socket connect timeout in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 1000)]
    timeout_ms: u64,

    /// Write results as JSON lines to this path (optional).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Suppress per-result console lines (the summary is still printed).
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let ports = match cli.ports.as_deref() {
        Some(spec) => ports::parse_port_spec(spec)?,
        None => ports::default_ports(),
    };

    println!("tcp-probe-rs configuration:");
    println!("  target     : {}", cli.target);
    println!("  ports      : {} port(s)", ports.len());
    println!("  timeout_ms : {}", cli.timeout_ms);
    println!(
        "  output     : {}",
        cli.output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<none>".to_string())
    );

    let mut scanner = TcpConnectScanner::new(
        cli.target.clone(),
        ports,
        Duration::from_millis(cli.timeout_ms),
    );

    if !cli.quiet {
        scanner.register(Arc::new(Mutex::new(ConsoleObserver)));
    }
    let summary = Arc::new(Mutex::new(SummaryObserver::new()));
    scanner.register(summary.clone());
    if let Some(path) = cli.output.as_deref() {
        scanner.register(Arc::new(Mutex::new(JsonLinesObserver::create(path)?)));
        println!("Writing JSON results to {}", path.display());
    }

    println!();
    let mut failure = None;
    {
        let mut probes = scanner.execute();
        while let Some(outcome) = probes.next().await {
            if let Err(e) = outcome {
                failure = Some(e);
            }
        }
    }

    print_summary(summary.lock().await.summary());

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn print_summary(summary: &ScanSummary) {
    println!(
        "\nProbed {} port(s): {} open, {} refused, {} timed out, {} unknown",
        summary.probed, summary.open, summary.refused, summary.timeout, summary.unknown
    );
}
