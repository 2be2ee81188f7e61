use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use nback_experiment::NBackConfig;

/// N-Back working-memory test
#[derive(Parser, Debug)]
#[command(name = "nback")]
#[command(author, version, about = "N-Back working-memory test", long_about = None)]
pub struct Cli {
    /// Logging verbosity level (logs go to stderr)
    #[arg(short, long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Write the finished session report as JSON to this file
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub test: TestArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Test configuration. Flags override values from `--config`.
#[derive(Args, Debug, Default, Clone)]
pub struct TestArgs {
    /// JSON file with any of n, trial_count, stimulus_kind, stimulus_duration_ms
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// How many steps back a match refers to
    #[arg(short = 'n', long = "n", global = true)]
    pub n: Option<usize>,

    /// Number of trials
    #[arg(short, long, global = true)]
    pub trials: Option<usize>,

    /// Stimulus kind: letters, numbers or positions
    #[arg(short, long, global = true)]
    pub stimulus: Option<String>,

    /// Stimulus duration in milliseconds
    #[arg(short, long = "duration-ms", global = true)]
    pub duration_ms: Option<u64>,
}

impl TestArgs {
    pub fn resolve(&self) -> Result<NBackConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str::<NBackConfig>(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => NBackConfig::default(),
        };

        if let Some(n) = self.n {
            config.n = n;
        }
        if let Some(trials) = self.trials {
            config.trial_count = trials;
        }
        if let Some(name) = &self.stimulus {
            config.set_stimulus_kind(name)?;
        }
        if let Some(ms) = self.duration_ms {
            config.stimulus_duration_ms = ms;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Interactive session in the terminal (default if no subcommand)
    Run,

    /// Run a session against a simulated subject on a virtual clock
    Simulate(SimulateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Seed for the sequence and the subject; random if omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Probability that the subject answers a trial correctly
    #[arg(long, default_value_t = 0.85)]
    pub accuracy: f64,

    /// Fastest simulated reaction time in milliseconds
    #[arg(long, default_value_t = 350)]
    pub min_rt_ms: u64,

    /// Slowest simulated reaction time in milliseconds
    #[arg(long, default_value_t = 900)]
    pub max_rt_ms: u64,
}
