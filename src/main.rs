use std::io::{self, Write};

use anyhow::Context as _;
use animcap::{CaptureConfig, Progress};
use clap::Parser;

/// Capture one cycle of the bundled HTML animation and save it as a looping GIF.
///
/// All settings are fixed; the binary takes no options.
#[derive(Parser, Debug)]
#[command(name = "animcap", version, about)]
struct Cli {}

fn print_progress(event: Progress<'_>) {
    match event {
        Progress::Launching => println!("Starting browser..."),
        Progress::Capturing { total, fps } => {
            println!("Capturing {} frames at {} FPS...", total, fps)
        }
        Progress::Frame { captured, total } => {
            print!("Frame {}/{}\r", captured, total);
            let _ = io::stdout().flush();
        }
        Progress::Encoding { output } => println!("\nSaving GIF to {}...", output.display()),
    }
}

fn main() -> anyhow::Result<()> {
    let _cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = CaptureConfig::default();
    let report = animcap::capture_animation(&config, print_progress)
        .with_context(|| format!("failed to capture {}", config.document.display()))?;

    println!("{}", report);
    Ok(())
}
