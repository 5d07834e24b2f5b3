//! PDF Editor
//!
//! Desktop entry point: parses arguments, sets up logging and opens the
//! editor window.

use clap::Parser;
use pdf_editor_core::EditorConfig;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pdf-editor", version, about = "Edit the text of PDF pages")]
struct Args {
    /// PDF file to open at startup
    file: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> eframe::Result {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    let args = Args::parse();

    let config = match args.config.as_deref() {
        Some(path) => match EditorConfig::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "loaded configuration");
                config
            }
            Err(e) => {
                error!(error = %e, "falling back to default configuration");
                EditorConfig::default()
            }
        },
        None => EditorConfig::default(),
    };

    pdf_editor_app::run(config, args.file)
}
