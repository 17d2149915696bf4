mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use submission_core::{load_settings, WorkflowController};
use tracing_subscriber::EnvFilter;

use backend_bridge::{commands::BackendCommand, runtime};
use controller::events::UiEvent;
use ui::DesktopWizardApp;

#[derive(Debug, Parser)]
#[command(name = "desktop_gui", about = "Story submission wizard")]
struct Args {
    /// Overrides the configured simulated submission delay.
    #[arg(long)]
    delay_ms: Option<u64>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut settings = load_settings();
    if let Some(delay_ms) = args.delay_ms {
        settings.submit_delay_ms = delay_ms;
    }
    tracing::info!(
        delay_ms = settings.submit_delay_ms,
        size_limit = ?settings.attachment_limit(),
        "starting story submission wizard"
    );

    let controller = WorkflowController::with_simulated_backend(settings);

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    runtime::launch(cmd_rx, ui_tx, controller.backend());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Submit Your Story")
            .with_inner_size([900.0, 760.0])
            .with_min_inner_size([640.0, 560.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "Story Submission",
        options,
        Box::new(|_cc| Ok(Box::new(DesktopWizardApp::new(controller, cmd_tx, ui_rx)))),
    )
}
