mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::{config, PredictionClient};
use crossbeam_channel::bounded;
use tracing_subscriber::EnvFilter;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::{app::APP_TITLE, LoanPredictorApp};

#[derive(Parser, Debug)]
#[command(name = "loan-gui", about = "Desktop client for the loan prediction service")]
struct Args {
    /// Prediction service base URL; overrides loan_client.toml and LOAN_API_URL.
    #[arg(long)]
    api_url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();
    let settings = config::load_settings()?.with_api_url_override(args.api_url)?;
    tracing::info!(api = %settings.api_base_url, "starting desktop client");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(PredictionClient::from_settings(&settings), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([1024.0, 760.0])
            .with_min_inner_size([720.0, 520.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |_cc| Ok(Box::new(LoanPredictorApp::new(cmd_tx, ui_rx, settings)))),
    )
    .map_err(|err| anyhow::anyhow!("desktop client failed: {err}"))
}
