//! Drives whole sessions through the public command/event boundary on a
//! manual clock.

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use nback_core::{Stimulus, StimulusKind};
use nback_experiment::{
    INTER_TRIAL_GAP_MS, NBackConfig, ResultsSummary, RunnerEvent, TrialRunner,
};
use nback_timing::{ManualTimer, Timer};

#[derive(Debug, Clone, Copy)]
enum Action {
    Match(u64),
    NoMatch(u64),
    Wait,
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (50u64..1900).prop_map(Action::Match),
        (50u64..1900).prop_map(Action::NoMatch),
        Just(Action::Wait),
    ]
}

/// Runs a session, answering each presentation with the next action.
/// Stops early (via end_test) after `stop_after` presentations if given.
fn run_session(
    config: NBackConfig,
    seed: u64,
    actions: &[Action],
    stop_after: Option<usize>,
) -> (ResultsSummary, Vec<Stimulus>, TrialRunner<ManualTimer, StdRng>) {
    let timer = ManualTimer::new();
    let mut runner = TrialRunner::new(timer.clone(), StdRng::seed_from_u64(seed));
    runner.start_test(config).unwrap();

    let mut shown = Vec::new();
    loop {
        for event in runner.update() {
            match event {
                RunnerEvent::TrialPresented { index, stimulus, .. } => {
                    if stop_after == Some(index) {
                        runner.end_test();
                        continue;
                    }
                    shown.push(stimulus);
                    match actions[index % actions.len()] {
                        Action::Match(rt) => {
                            timer.advance_ms(rt);
                            runner.signal_match();
                        }
                        Action::NoMatch(rt) => {
                            timer.advance_ms(rt);
                            runner.signal_no_match();
                        }
                        Action::Wait => {}
                    }
                }
                RunnerEvent::FeedbackReady { .. } => {}
                RunnerEvent::TestFinished(summary) => return (summary, shown, runner),
            }
        }
        match runner.next_deadline_ns() {
            Some(deadline) => timer.advance_to(deadline),
            // ended early; TestFinished is waiting in the next update
            None => assert!(runner.phase().is_finished()),
        }
    }
}

#[test]
fn perfect_subject_scores_full_accuracy() {
    let config = NBackConfig::new(2, 30, StimulusKind::Letters, 2000).unwrap();
    let timer = ManualTimer::new();
    let mut runner = TrialRunner::new(timer.clone(), StdRng::seed_from_u64(11));
    runner.start_test(config).unwrap();

    let mut seen: Vec<Stimulus> = Vec::new();
    let summary = loop {
        let mut done = None;
        for event in runner.update() {
            match event {
                RunnerEvent::TrialPresented { index, stimulus, .. } => {
                    seen.push(stimulus);
                    if index >= 2 && seen[index - 2] == stimulus {
                        timer.advance_ms(480);
                        runner.signal_match();
                    }
                }
                RunnerEvent::TestFinished(summary) => done = Some(summary),
                RunnerEvent::FeedbackReady { outcome, .. } => assert!(outcome.is_correct()),
            }
        }
        if let Some(summary) = done {
            break summary;
        }
        timer.advance_to(runner.next_deadline_ns().unwrap());
    };

    assert_eq!(summary.misses, 0);
    assert_eq!(summary.false_alarms, 0);
    assert_eq!(summary.total(), 30);
    if summary.hits > 0 {
        assert_eq!(summary.accuracy_percent, 100);
        assert_eq!(summary.mean_reaction_time_ms, Some(480.0));
    }
}

#[test]
fn session_length_in_time_follows_durations() {
    let config = NBackConfig::new(1, 4, StimulusKind::Digits, 1000).unwrap();
    let (_, shown, runner) = run_session(config, 3, &[Action::Wait], None);
    assert_eq!(shown.len(), 4);
    // four countdowns plus four gaps, the last gap precedes finishing
    assert_eq!(runner.timer().now(), 4 * (1000 + INTER_TRIAL_GAP_MS) * 1_000_000);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn counts_match_closed_trials(
        seed in any::<u64>(),
        n in 1usize..4,
        extra in 1usize..25,
        actions in prop::collection::vec(action_strategy(), 1..8)
    ) {
        let config = NBackConfig::new(n, n + extra, StimulusKind::Digits, 2000).unwrap();
        let (summary, shown, runner) = run_session(config.clone(), seed, &actions, None);
        prop_assert_eq!(summary.total() as usize, config.trial_count);
        prop_assert_eq!(shown.len(), config.trial_count);

        let report = runner.last_report().unwrap();
        prop_assert_eq!(report.summary, summary);
        for response in &report.responses {
            let waited = matches!(actions[response.trial_index % actions.len()], Action::Wait);
            prop_assert_eq!(response.timed_out(), waited);
        }
    }

    #[test]
    fn early_end_counts_only_attempted(
        seed in any::<u64>(),
        stop in 0usize..10,
        actions in prop::collection::vec(action_strategy(), 1..5)
    ) {
        let config = NBackConfig::new(2, 10, StimulusKind::GridPosition, 1500).unwrap();
        let (summary, _, mut runner) = run_session(config, seed, &actions, Some(stop));
        prop_assert_eq!(summary.total() as usize, stop);

        runner.signal_match();
        prop_assert!(runner.update().is_empty());
        prop_assert_eq!(runner.last_report().unwrap().summary, summary);
    }
}
