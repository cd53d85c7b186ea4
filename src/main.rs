use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::task::JoinHandle;
use tracing::error;
use tracing_subscriber::EnvFilter;

use flowscore::{collect_group_metrics, CpuSource, FlowApi, MetricSnapshot, Refresher, Settings, StaticFlowApi};

#[derive(Parser, Debug)]
#[command(name = "flowscore")]
#[command(about = "Flow complexity and runtime-health scoring for NiFi-style flow APIs")]
struct Args {
    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the flow REST API
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Bearer token sent with every request
    #[arg(short, long)]
    token: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Refresh interval in seconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Process group the refresh starts from
    #[arg(long)]
    root_group: Option<String>,

    /// CPU sample source: diagnostics, host or disabled
    #[arg(long)]
    cpu_source: Option<CpuSource>,

    /// Serve API responses from a captured JSON file instead of HTTP
    #[arg(long, conflicts_with_all = ["endpoint", "token", "insecure"])]
    replay: Option<PathBuf>,

    /// Run a single refresh, print the snapshot as JSON and exit
    #[arg(long, conflicts_with = "group")]
    once: bool,

    /// Print structural metrics of one process group as JSON and exit
    #[arg(short, long)]
    group: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout carries only snapshots
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let settings = load_settings(&args)?;
    let api = build_api(&args, &settings)?;

    let rt = tokio::runtime::Runtime::new()?;

    if let Some(group) = &args.group {
        let snapshot = rt.block_on(collect_group_metrics(
            api.as_ref(),
            group,
            settings.poll.crawl_concurrency,
        ))?;
        return print_snapshot(&snapshot, true);
    }

    let mut refresher = Refresher::from_settings(api, &settings);

    if args.once {
        let snapshot = rt.block_on(refresher.refresh())?;
        return print_snapshot(&snapshot, true);
    }

    rt.block_on(run_until_ctrl_c(refresher, settings.interval()));
    Ok(())
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;

    if let Some(endpoint) = &args.endpoint {
        settings.api.endpoint = endpoint.clone();
    }
    if let Some(token) = &args.token {
        settings.api.token = Some(token.clone());
    }
    if args.insecure {
        settings.api.verify_tls = false;
    }
    if let Some(secs) = args.interval {
        settings.poll.interval_ms = secs.saturating_mul(1000);
    }
    if let Some(root_group) = &args.root_group {
        settings.poll.root_group = root_group.clone();
    }
    if let Some(cpu_source) = args.cpu_source {
        settings.trend.cpu_source = cpu_source;
    }

    Ok(settings)
}

fn build_api(args: &Args, settings: &Settings) -> Result<Arc<dyn FlowApi>> {
    if let Some(path) = &args.replay {
        return Ok(Arc::new(load_replay(path)?));
    }
    let adapter = settings
        .build_adapter()
        .with_context(|| format!("Failed to set up client for {}", settings.api.endpoint))?;
    Ok(Arc::new(adapter))
}

/// Load captured responses keyed by path
fn load_replay(path: &Path) -> Result<StaticFlowApi> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let captured: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(StaticFlowApi::from_value(captured)?)
}

/// Poll until Ctrl+C, printing each published snapshot as one JSON line
async fn run_until_ctrl_c(mut refresher: Refresher, period: Duration) {
    let mut receiver = refresher.subscribe();
    let printer = tokio::spawn(async move {
        while receiver.changed().await.is_ok() {
            let snapshot = receiver.borrow_and_update().clone();
            if let Err(e) = print_snapshot(&snapshot, false) {
                error!("Failed to write snapshot: {}", e);
            }
        }
    });

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    refresher.run(period, shutdown).await;

    // Dropping the refresher closes the channel and ends the printer
    drop(refresher);
    join_printer(printer).await;
}

/// Wait for the printer task, logging a panic or cancellation.
async fn join_printer(printer: JoinHandle<()>) -> bool {
    match printer.await {
        Ok(()) => true,
        Err(e) => {
            error!("Snapshot printer task failed: {}", e);
            false
        }
    }
}

fn print_snapshot(snapshot: &MetricSnapshot, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(snapshot)?
    } else {
        serde_json::to_string(snapshot)?
    };
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_join_printer_completed() {
        let printer = tokio::spawn(async {});
        assert!(join_printer(printer).await);
    }

    #[tokio::test]
    async fn test_join_printer_reports_panic() {
        let printer = tokio::spawn(async {
            panic!("printer failed");
        });
        assert!(!join_printer(printer).await);
    }

    #[tokio::test]
    async fn test_join_printer_reports_abort() {
        let printer = tokio::spawn(std::future::pending::<()>());
        printer.abort();
        assert!(!join_printer(printer).await);
    }
}
