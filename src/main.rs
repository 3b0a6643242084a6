use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use sharedlimit::config::AppConfig;
use sharedlimit::ratelimit::{parse_interval, RateLimit, Registry};

/// How long to wait for the rate limit to close on shutdown.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);
/// Back-off applied when a backend fails to answer.
const ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Drive a set of workers through one shared rate limit.
#[derive(Parser, Debug)]
#[command(name = "sharedlimit", version, about)]
struct Cli {
    /// Path to a YAML or JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Accesses permitted per interval
    #[arg(long, allow_negative_numbers = true)]
    count: Option<i64>,

    /// Interval length, e.g. "1s" or "500ms"
    #[arg(long)]
    interval: Option<String>,

    /// Number of concurrent workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// How long to run before shutting down
    #[arg(long)]
    run_for: Option<String>,

    /// Print the registered rate limit types and exit
    #[arg(long)]
    list_kinds: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let registry = Registry::with_defaults();

    if cli.list_kinds {
        for kind in registry.kinds() {
            println!("{}: {}", kind, registry.description(kind).unwrap_or_default());
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => AppConfig::default(),
    };
    apply_overrides(&mut config, &cli);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .init();

    info!("Starting sharedlimit");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        kind = %config.rate_limit.kind,
        count = config.rate_limit.local.count,
        interval = %config.rate_limit.local.interval,
        workers = config.workers,
        "Configuration loaded"
    );

    if config.workers == 0 {
        anyhow::bail!("workers must be larger than zero");
    }
    let run_for = parse_interval(&config.run_for).context("invalid run_for")?;
    let limiter = registry
        .build(&config.rate_limit)
        .context("failed to create rate limit")?;

    let (stop_tx, stop_rx) = watch::channel(false);
    let mut tasks = JoinSet::new();
    for id in 0..config.workers {
        tasks.spawn(run_worker(id, Arc::clone(&limiter), stop_rx.clone()));
    }

    let started = Instant::now();
    tokio::select! {
        _ = shutdown_signal() => {}
        _ = tokio::time::sleep(run_for) => {
            info!(run_for = ?run_for, "Run duration elapsed, stopping workers");
        }
    }
    // Receivers are still held by the workers, so this cannot fail.
    let _ = stop_tx.send(true);

    let mut total = 0u64;
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok((id, granted)) => {
                info!(worker = id, granted = granted, "Worker stopped");
                total += granted;
            }
            Err(e) => error!(error = %e, "Worker panicked"),
        }
    }

    limiter.close_async();
    limiter
        .wait_for_close(CLOSE_TIMEOUT)
        .await
        .context("rate limit did not close cleanly")?;

    let elapsed = started.elapsed();
    info!(
        granted = total,
        elapsed = ?elapsed,
        per_second = total as f64 / elapsed.as_secs_f64(),
        "sharedlimit stopped"
    );
    Ok(())
}

/// Command line flags win over the configuration file.
fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(count) = cli.count {
        config.rate_limit.local.count = count;
    }
    if let Some(interval) = &cli.interval {
        config.rate_limit.local.interval = interval.clone();
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(run_for) = &cli.run_for {
        config.run_for = run_for.clone();
    }
}

/// Access the shared limit in a loop until told to stop.
///
/// Returns the worker id and how many accesses it was granted.
async fn run_worker(
    id: usize,
    limiter: Arc<dyn RateLimit>,
    mut stop: watch::Receiver<bool>,
) -> (usize, u64) {
    let mut granted = 0u64;

    while !*stop.borrow() {
        let wait = match limiter.access().await {
            Ok(wait) => wait,
            Err(e) => {
                warn!(worker = id, error = %e, "Rate limit check failed");
                ERROR_BACKOFF
            }
        };

        if wait.is_zero() {
            granted += 1;
            tokio::task::yield_now().await;
            continue;
        }

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = stop.changed() => break,
        }
    }

    (id, granted)
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
