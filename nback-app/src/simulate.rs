use std::ops::RangeInclusive;

use anyhow::{Context, Result, ensure};
use nback_core::Stimulus;
use nback_experiment::{NBackConfig, RunnerEvent, SessionReport, TrialRunner};
use nback_timing::ManualTimer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::cli::SimulateArgs;
use crate::display;

/// Virtual subject that remembers what it saw and answers correctly with a
/// fixed probability.
pub struct SimulatedSubject<R: Rng> {
    rng: R,
    n: usize,
    accuracy: f64,
    rt_ms: RangeInclusive<u64>,
    seen: Vec<Stimulus>,
}

impl<R: Rng> SimulatedSubject<R> {
    pub fn new(rng: R, n: usize, accuracy: f64, rt_ms: RangeInclusive<u64>) -> Self {
        Self {
            rng,
            n,
            accuracy,
            rt_ms,
            seen: Vec::new(),
        }
    }

    /// Reaction time in ms if the subject signals a match, `None` to let
    /// the trial time out.
    pub fn respond(&mut self, stimulus: Stimulus) -> Option<u64> {
        self.seen.push(stimulus);
        let i = self.seen.len() - 1;
        let is_match = i >= self.n && self.seen[i - self.n] == stimulus;
        let correct = self.rng.random_bool(self.accuracy);
        (is_match == correct).then(|| self.rng.random_range(self.rt_ms.clone()))
    }
}

pub fn run(config: NBackConfig, args: &SimulateArgs) -> Result<SessionReport> {
    ensure!(
        (0.0..=1.0).contains(&args.accuracy),
        "accuracy must be within 0..=1, got {}",
        args.accuracy
    );
    ensure!(
        args.min_rt_ms <= args.max_rt_ms && args.max_rt_ms < config.stimulus_duration_ms,
        "reaction time range {}..={} ms must fit inside the {} ms stimulus duration",
        args.min_rt_ms,
        args.max_rt_ms,
        config.stimulus_duration_ms
    );

    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    info!(seed, accuracy = args.accuracy, "simulating subject");

    let timer = ManualTimer::new();
    let mut runner = TrialRunner::new(timer.clone(), StdRng::seed_from_u64(seed));
    let mut subject = SimulatedSubject::new(
        StdRng::seed_from_u64(seed.wrapping_add(1)),
        config.n,
        args.accuracy,
        args.min_rt_ms..=args.max_rt_ms,
    );
    let n = config.n;
    runner.start_test(config)?;

    loop {
        for event in runner.update() {
            match event {
                RunnerEvent::TrialPresented {
                    index,
                    stimulus,
                    total_trials,
                } => {
                    println!("{}  {stimulus}", display::trial_header(index, total_trials, n));
                    if let Some(rt) = subject.respond(stimulus) {
                        timer.advance_ms(rt);
                        runner.signal_match();
                    }
                }
                RunnerEvent::FeedbackReady { index, outcome } => {
                    debug!(index, ?outcome, "simulated trial closed");
                    println!("    {}", outcome.feedback_text());
                }
                RunnerEvent::TestFinished(summary) => {
                    println!("{}", display::results(&summary));
                    return runner
                        .last_report()
                        .cloned()
                        .context("finished session produced no report");
                }
            }
        }
        let deadline = runner
            .next_deadline_ns()
            .context("simulation stalled without a pending timer")?;
        timer.advance_to(deadline);
    }
}
