//! balancerd — the ingredients balancer daemon.
//!
//! Single binary that serves the balance API:
//! - Balance and pan-measurement routes
//! - Health and Prometheus endpoints
//! - Periodic metrics summary in the log
//! - OTLP span export (`telemetry` feature)
//!
//! # Usage
//!
//! ```text
//! balancerd serve --config /etc/balancer/balancer.toml
//! balancerd serve --port 8081
//! balancerd config
//! ```

mod telemetry;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use balancer_core::ServiceConfig;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::telemetry::Telemetry;

#[derive(Parser)]
#[command(name = "balancerd", about = "Ingredients balancer daemon")]
struct Cli {
    /// Path to balancer.toml. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        /// Port to listen on. Overrides the config file and HTTP_PORT.
        #[arg(long)]
        port: Option<u16>,

        /// Metrics summary interval in seconds.
        #[arg(long)]
        metrics_interval: Option<u64>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Serve {
            port,
            metrics_interval,
        } => {
            if let Some(port) = port {
                config.server.http_port = port;
            }
            if let Some(secs) = metrics_interval {
                config.metrics.summary_interval_secs = secs;
            }
            let telemetry = init_tracing(&config)?;
            run_server(config, telemetry).await
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<ServiceConfig> {
    let mut config = match path {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::default(),
    };
    config.apply_env(|key| std::env::var(key).ok())?;
    Ok(config)
}

fn init_tracing(config: &ServiceConfig) -> anyhow::Result<Telemetry> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.filter));

    let fmt_layer = if config.log.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    let (otel_layer, telemetry) = telemetry::init(&config.tracing)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .init();

    telemetry.log_status();
    Ok(telemetry)
}

async fn run_server(config: ServiceConfig, telemetry: Telemetry) -> anyhow::Result<()> {
    info!(
        service = balancer_api::SERVICE_NAME,
        version = env!("CARGO_PKG_VERSION"),
        "ingredients balancer starting"
    );

    let metrics = Arc::new(balancer_metrics::MetricsCollector::new(
        config.summary_interval(),
    ));
    info!(
        interval_secs = config.summary_interval().as_secs(),
        "metrics collector initialized"
    );

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let metrics_handle = tokio::spawn({
        let metrics = metrics.clone();
        async move { metrics.run(shutdown_rx).await }
    });

    // ── Start API server ───────────────────────────────────────

    let router = balancer_api::build_router(metrics);
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");

    let served = serve(
        listener,
        router,
        async {
            shutdown_signal().await;
            info!("shutdown signal received");
        },
        shutdown_tx,
    )
    .await;

    if let Err(e) = metrics_handle.await {
        warn!(error = %e, "metrics task ended abnormally");
    }

    info!("ingredients balancer stopped");
    telemetry.shutdown().await;
    served?;
    Ok(())
}

/// Serve until `signal` resolves and in-flight requests have drained, then
/// tell the metrics loop to stop.
async fn serve<F>(
    listener: TcpListener,
    router: Router,
    signal: F,
    metrics_shutdown: watch::Sender<bool>,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let result = axum::serve(listener, router)
        .with_graceful_shutdown(signal)
        .await;
    metrics_shutdown.send_replace(true);
    result
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
