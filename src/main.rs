mod config;
mod gui;
mod report;
mod scanner;
mod session;
mod threat;

use std::path::PathBuf;

use clap::Parser;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "secureguard", about = "SecureGuard antivirus dashboard")]
struct Args {
    /// JSON file overriding the scripted scan behaviour.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &args.config {
        Some(path) => AppConfig::load(path).unwrap_or_else(|err| {
            tracing::error!("{err}; falling back to default config");
            AppConfig::default()
        }),
        None => AppConfig::default(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("SecureGuard Antivirus")
            .with_inner_size([1100.0, 820.0])
            .with_min_inner_size([820.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "SecureGuard Antivirus",
        options,
        Box::new(move |_cc| Box::new(gui::MainApp::new(config))),
    )
}
