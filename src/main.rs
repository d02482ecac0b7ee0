//! locwatch - Permission-aware, lifecycle-driven location tracking
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::Parser;
use locwatch_app::config::init_config_dir;

/// locwatch - Drive a location tracking controller from stdin
#[derive(Parser, Debug)]
#[command(name = "locwatch")]
#[command(about = "Drive a location tracking controller from stdin", long_about = None)]
struct Args {
    /// Project directory holding .locwatch/config.toml
    #[arg(long, value_name = "DIR")]
    project: Option<PathBuf>,

    /// Write a default .locwatch/config.toml and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let project_path = args
        .project
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    if args.init_config {
        init_config_dir(&project_path)?;
        eprintln!(
            "Wrote {}",
            project_path.join(".locwatch").join("config.toml").display()
        );
        let log_file = locwatch_core::logging::get_current_log_file()?;
        eprintln!("Logs are written next to {}", log_file.display());
        return Ok(());
    }

    // Logs go to a file; stdout carries the event stream
    locwatch_core::logging::init()?;

    locwatch::run_headless(&project_path).await?;
    Ok(())
}
