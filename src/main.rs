// Main entry point - Dependency injection and front end selection
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{routing::get, Router};
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;

use crate::application::device_service::DeviceService;
use crate::application::metrics_service::MetricsService;
use crate::application::monitoring_repository::MonitoringRepository;
use crate::application::normalizer::TimeFormatter;
use crate::domain::window::RangeSelector;
use crate::infrastructure::config::{load_app_config, AppConfig, DEFAULT_CONFIG_PATH};
use crate::infrastructure::http_repository::HttpMonitoringRepository;
use crate::infrastructure::logging;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{get_host_metrics, health_check, list_devices};
use crate::presentation::tui::{self, TuiOptions};

#[derive(Parser, Debug)]
#[command(name = "host-metrics", version, about = "Browse host metrics from a monitoring service")]
struct Args {
    /// Config file (extension optional)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the metrics page as JSON over HTTP
    Serve {
        /// Listen address, overriding the config file
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Browse metrics interactively in the terminal
    Tui {
        /// Device (host id) to open on start
        #[arg(short, long)]
        device: Option<String>,

        /// Initial time range: 1h, 24h, 7d or 30d
        #[arg(short, long)]
        range: Option<RangeSelector>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = load_app_config(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config))?;

    match args.command {
        Command::Serve { bind } => {
            logging::init_stderr();
            serve(config, bind).await
        }
        Command::Tui { device, range } => {
            logging::init_file(&config.logging.file)?;
            let repository = build_repository(&config)?;
            let options = TuiOptions {
                device,
                range: range.unwrap_or(config.display.default_range),
                formatter: TimeFormatter::from_offset_minutes(config.display.utc_offset_minutes),
            };
            tui::run(repository, options).await
        }
    }
}

fn build_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn MonitoringRepository>> {
    let repository = HttpMonitoringRepository::new(&config.monitoring)?;
    tracing::info!("Using monitoring service at {}", config.monitoring.base_url);
    Ok(Arc::new(repository))
}

async fn serve(config: AppConfig, bind: Option<String>) -> anyhow::Result<()> {
    // Create repository (infrastructure layer)
    let repository = build_repository(&config)?;

    // Create services (application layer)
    let formatter = TimeFormatter::from_offset_minutes(config.display.utc_offset_minutes);
    let state = Arc::new(AppState {
        device_service: DeviceService::new(repository.clone()),
        metrics_service: MetricsService::new(repository, formatter),
        default_range: config.display.default_range,
    });

    // Build router (presentation layer)
    // Handlers brotli-encode their own bodies; no CompressionLayer here
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/devices", get(list_devices))
        .route("/devices/:hostid/metrics", get(get_host_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let bind = bind.unwrap_or(config.server.bind);
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid listen address {}", bind))?;
    tracing::info!("Starting host-metrics service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
