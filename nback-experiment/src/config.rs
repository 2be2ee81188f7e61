use std::time::Duration;

use nback_core::{ParseStimulusKindError, StimulusKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chance that a trial at index >= n is forced to repeat the stimulus n back
pub const TARGET_PROBABILITY: f64 = 0.3;
/// Pause between feedback and the next presentation
pub const INTER_TRIAL_GAP_MS: u64 = 500;
/// Largest accepted n
pub const MAX_N: usize = 9;
/// Largest accepted trial count
pub const MAX_TRIALS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NBackConfig {
    pub n: usize,
    pub trial_count: usize,
    pub stimulus_kind: StimulusKind,
    pub stimulus_duration_ms: u64,
}

impl Default for NBackConfig {
    fn default() -> Self {
        Self {
            n: 2,
            trial_count: 30,
            stimulus_kind: StimulusKind::Letters,
            stimulus_duration_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("n must be between 1 and {max}, got {n}")]
    InvalidN { n: usize, max: usize },

    #[error("trial count must be greater than n (n = {n}, trial count = {trial_count})")]
    TooFewTrials { n: usize, trial_count: usize },

    #[error("trial count must be at most {max}, got {trial_count}")]
    TooManyTrials { trial_count: usize, max: usize },

    #[error("stimulus duration must be positive")]
    ZeroDuration,

    #[error(transparent)]
    UnknownStimulusKind(#[from] ParseStimulusKindError),

    #[error("{kind} alphabet has {size} symbols, at least 2 are needed")]
    AlphabetTooSmall { kind: StimulusKind, size: usize },
}

impl NBackConfig {
    pub fn new(
        n: usize,
        trial_count: usize,
        stimulus_kind: StimulusKind,
        stimulus_duration_ms: u64,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            n,
            trial_count,
            stimulus_kind,
            stimulus_duration_ms,
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the stimulus kind from its form name (`letters`, `numbers`, ...).
    pub fn set_stimulus_kind(&mut self, name: &str) -> Result<(), ConfigError> {
        self.stimulus_kind = name.parse::<StimulusKind>()?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_N).contains(&self.n) {
            return Err(ConfigError::InvalidN {
                n: self.n,
                max: MAX_N,
            });
        }
        if self.trial_count <= self.n {
            return Err(ConfigError::TooFewTrials {
                n: self.n,
                trial_count: self.trial_count,
            });
        }
        if self.trial_count > MAX_TRIALS {
            return Err(ConfigError::TooManyTrials {
                trial_count: self.trial_count,
                max: MAX_TRIALS,
            });
        }
        if self.stimulus_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        let size = self.stimulus_kind.alphabet_len();
        if size < 2 {
            return Err(ConfigError::AlphabetTooSmall {
                kind: self.stimulus_kind,
                size,
            });
        }
        Ok(())
    }

    pub fn stimulus_duration(&self) -> Duration {
        Duration::from_millis(self.stimulus_duration_ms)
    }
}
