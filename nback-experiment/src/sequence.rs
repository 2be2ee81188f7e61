use std::collections::BTreeSet;

use nback_core::{Stimulus, StimulusKind};
use rand::Rng;
use tracing::debug;

use crate::config::{ConfigError, NBackConfig, TARGET_PROBABILITY};

/// Stimulus stream for one session plus the indices forced to match n back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedSequence {
    stimuli: Vec<Stimulus>,
    targets: BTreeSet<usize>,
}

impl GeneratedSequence {
    pub fn stimuli(&self) -> &[Stimulus] {
        &self.stimuli
    }

    pub fn targets(&self) -> &BTreeSet<usize> {
        &self.targets
    }

    pub fn get(&self, index: usize) -> Option<Stimulus> {
        self.stimuli.get(index).copied()
    }

    pub fn is_target(&self, index: usize) -> bool {
        self.targets.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.stimuli.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stimuli.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn from_parts(stimuli: Vec<Stimulus>, targets: impl IntoIterator<Item = usize>) -> Self {
        Self {
            stimuli,
            targets: targets.into_iter().collect(),
        }
    }
}

/// Builds a sequence where every index >= n is either a forced target or
/// guaranteed to differ from the stimulus n back.
pub fn generate<R: Rng>(config: &NBackConfig, rng: &mut R) -> Result<GeneratedSequence, ConfigError> {
    config.validate()?;

    let kind = config.stimulus_kind;
    let n = config.n;
    let mut stimuli = Vec::with_capacity(config.trial_count);
    let mut targets = BTreeSet::new();

    for i in 0..config.trial_count {
        let stimulus = if i < n {
            draw(kind, rng)
        } else {
            let back = stimuli[i - n];
            if rng.random_bool(TARGET_PROBABILITY) {
                targets.insert(i);
                back
            } else {
                // alphabet size >= 2 was checked by validate()
                loop {
                    let candidate = draw(kind, rng);
                    if candidate != back {
                        break candidate;
                    }
                }
            }
        };
        stimuli.push(stimulus);
    }

    debug!(
        n,
        trials = stimuli.len(),
        targets = targets.len(),
        kind = %kind,
        "generated sequence"
    );

    Ok(GeneratedSequence { stimuli, targets })
}

fn draw<R: Rng>(kind: StimulusKind, rng: &mut R) -> Stimulus {
    kind.symbol(rng.random_range(0..kind.alphabet_len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_TRIALS;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config(n: usize, trial_count: usize, kind: StimulusKind) -> NBackConfig {
        NBackConfig::new(n, trial_count, kind, 1000).unwrap()
    }

    #[test]
    fn length_matches_trial_count() {
        let mut rng = StdRng::seed_from_u64(1);
        for kind in StimulusKind::ALL {
            let seq = generate(&config(2, 30, kind), &mut rng).unwrap();
            assert_eq!(seq.len(), 30);
            assert!(seq.stimuli().iter().all(|s| s.kind() == kind));
        }
    }

    #[test]
    fn targets_and_non_targets_hold_across_seeds() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let cfg = config(3, 40, StimulusKind::GridPosition);
            let seq = generate(&cfg, &mut rng).unwrap();
            let s = seq.stimuli();
            for i in 0..s.len() {
                if i < cfg.n {
                    assert!(!seq.is_target(i), "seed {seed}: early index {i} marked target");
                } else if seq.is_target(i) {
                    assert_eq!(s[i], s[i - cfg.n], "seed {seed}: target {i}");
                } else {
                    assert_ne!(s[i], s[i - cfg.n], "seed {seed}: accidental match at {i}");
                }
            }
        }
    }

    #[test]
    fn same_seed_reproduces_sequence() {
        let cfg = config(2, 25, StimulusKind::Letters);
        let a = generate(&cfg, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = generate(&cfg, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn target_density_is_near_thirty_percent() {
        let cfg = config(1, MAX_TRIALS, StimulusKind::Digits);
        let mut rng = StdRng::seed_from_u64(5);
        let mut targets = 0;
        for _ in 0..10 {
            targets += generate(&cfg, &mut rng).unwrap().targets().len();
        }
        let rate = targets as f64 / (10 * (MAX_TRIALS - 1)) as f64;
        assert!((0.27..0.33).contains(&rate), "target rate {rate}");
    }

    #[test]
    fn oversized_trial_count_is_an_error() {
        let cfg = NBackConfig {
            n: 1,
            trial_count: usize::MAX,
            stimulus_kind: StimulusKind::Digits,
            stimulus_duration_ms: 1000,
        };
        assert_eq!(
            generate(&cfg, &mut StdRng::seed_from_u64(0)),
            Err(ConfigError::TooManyTrials {
                trial_count: usize::MAX,
                max: MAX_TRIALS
            })
        );
    }

    #[test]
    fn invalid_config_is_rejected_before_drawing() {
        let cfg = NBackConfig {
            n: 4,
            trial_count: 4,
            ..NBackConfig::default()
        };
        let err = generate(&cfg, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::TooFewTrials {
                n: 4,
                trial_count: 4
            }
        );
    }
}
