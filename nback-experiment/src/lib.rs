pub mod config;
pub mod report;
pub mod scoring;
pub mod sequence;
pub mod state;
pub mod trial;
pub use config::{
    ConfigError, INTER_TRIAL_GAP_MS, MAX_N, MAX_TRIALS, NBackConfig, TARGET_PROBABILITY,
};
pub use report::SessionReport;
pub use scoring::ResultsSummary;
pub use sequence::{GeneratedSequence, generate};
pub use state::{Command, ResponseKind, RunnerEvent, SessionError, TrialRunner};
