//! `nback` terminal front-end.
//!
//! ```bash
//! # interactive 2-back with letters (defaults)
//! nback
//!
//! # 3-back on grid positions, report saved as JSON
//! nback run -n 3 --stimulus positions --output session.json
//!
//! # simulated subject, no real waiting
//! nback simulate --seed 7 --accuracy 0.8
//! ```

mod app;
mod cli;
mod display;
mod simulate;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use nback_experiment::SessionReport;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use app::App;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("nback v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.test.resolve()?;

    match cli.command {
        None | Some(Commands::Run) => App::new(config, cli.output).run()?,
        Some(Commands::Simulate(args)) => {
            let report = simulate::run(config, &args)?;
            if let Some(path) = &cli.output {
                write_report(path, &report)?;
            }
        }
    }

    Ok(())
}

pub(crate) fn write_report(path: &Path, report: &SessionReport) -> Result<()> {
    let json = report.to_json_pretty()?;
    fs::write(path, json).with_context(|| format!("writing report {}", path.display()))?;
    info!(path = %path.display(), "session report written");
    Ok(())
}
