mod actions;
mod client;
mod config;
mod error;
mod format;
mod markup;
mod mock;
mod models;
mod scheduler;
mod store;
mod ui;
mod view;

use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use eframe::egui;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::actions::Dashboard;
use crate::client::{Backend, HttpBackend};
use crate::config::DashboardConfig;
use crate::mock::MockBackend;

#[derive(Parser, Debug)]
#[command(name = "netmon-dash")]
#[command(about = "Desktop dashboard for the network device monitor")]
struct Args {
    /// Optional configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<String>,

    /// Monitor backend base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Auto-refresh interval in milliseconds
    #[arg(long)]
    refresh_ms: Option<u64>,

    /// Number of recent events to fetch
    #[arg(long)]
    events_limit: Option<usize>,

    /// Run against a simulated network instead of a backend
    #[arg(long, short)]
    demo: bool,

    /// Fetch once, write the dashboard as HTML to this path and exit
    #[arg(long)]
    snapshot: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut DashboardConfig) {
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(ms) = self.refresh_ms {
            config.refresh_interval_ms = ms;
        }
        if let Some(limit) = self.events_limit {
            config.events_limit = limit;
        }
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("netmon_dash={}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn write_snapshot(
    backend: Arc<dyn Backend>,
    config: &DashboardConfig,
    path: &str,
) -> Result<()> {
    let mut dashboard = Dashboard::new(backend, tokio::runtime::Handle::current(), config);
    dashboard.refresh_once().await;

    let view = view::dashboard_view(&dashboard, Local::now());
    std::fs::write(path, markup::document(&view))?;
    info!(
        "Snapshot written to {} ({} devices, {} events)",
        path,
        dashboard.store().devices().len(),
        dashboard.store().events().len()
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = config::load_config(args.config.as_deref())?;
    args.apply(&mut config);
    init_tracing(&config.log_level);

    let runtime = tokio::runtime::Runtime::new()?;

    let backend: Arc<dyn Backend> = if args.demo {
        info!("Running in DEMO mode with a simulated network");
        Arc::new(MockBackend::demo())
    } else {
        let backend = HttpBackend::new(&config.api_url, config.request_timeout())?;
        info!("Connecting to {}", backend.base_url());
        Arc::new(backend)
    };

    if let Some(path) = &args.snapshot {
        return runtime.block_on(write_snapshot(backend, &config, path));
    }

    let mut dashboard = Dashboard::new(backend, runtime.handle().clone(), &config);
    dashboard.start();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 760.0])
            .with_title("Network Monitor Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Network Monitor Dashboard",
        options,
        Box::new(move |cc| {
            // Force light mode
            cc.egui_ctx.set_visuals(egui::Visuals::light());
            Box::new(ui::DashboardApp::new(cc, dashboard))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run application: {}", e))
}
