use nback_core::{Outcome, SessionPhase, Stimulus, TrialPhase, TrialResponse};
use nback_timing::Timer;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, trace};

use super::config::{ConfigError, INTER_TRIAL_GAP_MS, NBackConfig};
use super::report::SessionReport;
use super::scoring::ResultsSummary;
use super::sequence::{self, GeneratedSequence};
use super::trial::{ActiveTrial, PendingTimer, TimerKind};

const NS_PER_MS: u64 = 1_000_000;

/// Outbound events for the display layer
#[derive(Debug, Clone, PartialEq)]
pub enum RunnerEvent {
    TrialPresented {
        index: usize,
        stimulus: Stimulus,
        total_trials: usize,
    },
    FeedbackReady {
        index: usize,
        outcome: Outcome,
    },
    TestFinished(ResultsSummary),
}

/// How a trial was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Subject claims the stimulus matches n back
    Match,
    /// Subject explicitly answers "no match" before the countdown ends
    NoMatch,
    /// Countdown elapsed without a signal
    Timeout,
}

impl ResponseKind {
    fn user_responded(self) -> bool {
        matches!(self, ResponseKind::Match)
    }

    fn is_subject_signal(self) -> bool {
        !matches!(self, ResponseKind::Timeout)
    }
}

/// Argument-free commands, one per key or button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SignalMatch,
    SignalNoMatch,
    EndTest,
    Retry,
    NewTest,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("a test is already running")]
    AlreadyRunning,

    #[error("no previous test to retry")]
    NoPreviousTest,
}

/// Drives one n-back session at a time. The runner never sleeps: the owner
/// calls [`TrialRunner::update`] from its frame or event loop, and at most
/// one timer (countdown or gap) is outstanding at any moment.
pub struct TrialRunner<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    timer: T,
    rng: R,
    phase: SessionPhase,
    config: Option<NBackConfig>,
    sequence: GeneratedSequence,
    current: Option<ActiveTrial<u64>>,
    trial_index: usize,
    responses: Vec<TrialResponse>,
    pending: Option<PendingTimer>,
    outbox: Vec<RunnerEvent>,
    report: Option<SessionReport>,
}

impl<T, R> TrialRunner<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub fn new(timer: T, rng: R) -> Self {
        Self {
            timer,
            rng,
            phase: SessionPhase::Idle,
            config: None,
            sequence: GeneratedSequence::default(),
            current: None,
            trial_index: 0,
            responses: Vec::new(),
            pending: None,
            outbox: Vec::new(),
            report: None,
        }
    }

    pub fn start_test(&mut self, config: NBackConfig) -> Result<(), SessionError> {
        if !self.phase.can_start() {
            return Err(SessionError::AlreadyRunning);
        }
        let sequence = sequence::generate(&config, &mut self.rng)?;

        self.pending = None;
        self.current = None;
        self.trial_index = 0;
        self.responses.clear();
        self.report = None;
        self.sequence = sequence;

        info!(
            n = config.n,
            trials = config.trial_count,
            kind = %config.stimulus_kind,
            duration_ms = config.stimulus_duration_ms,
            "starting n-back test"
        );
        self.config = Some(config);
        self.phase = SessionPhase::Running;
        self.present_trial();
        Ok(())
    }

    /// Starts again with the last configuration and a fresh sequence.
    pub fn retry_test(&mut self) -> Result<(), SessionError> {
        if !self.phase.can_start() {
            return Err(SessionError::AlreadyRunning);
        }
        let config = self.config.clone().ok_or(SessionError::NoPreviousTest)?;
        self.start_test(config)
    }

    /// Back to configuration input. Delivered results are left alone.
    pub fn new_test(&mut self) {
        if self.phase.is_finished() {
            debug!("returning to idle");
            self.phase = SessionPhase::Idle;
        } else {
            trace!(phase = ?self.phase, "new_test ignored");
        }
    }

    pub fn signal_match(&mut self) {
        self.expire_response_window();
        self.handle_response(ResponseKind::Match);
    }

    pub fn signal_no_match(&mut self) {
        self.expire_response_window();
        self.handle_response(ResponseKind::NoMatch);
    }

    /// Manual early termination; scores whatever was collected so far.
    pub fn end_test(&mut self) {
        if !self.phase.is_running() {
            trace!(phase = ?self.phase, "end_test ignored");
            return;
        }
        self.pending = None;
        info!(
            completed = self.responses.len(),
            total = self.sequence.len(),
            "test ended by subject"
        );
        self.finish();
    }

    pub fn handle_command(&mut self, command: Command) -> Result<(), SessionError> {
        match command {
            Command::SignalMatch => self.signal_match(),
            Command::SignalNoMatch => self.signal_no_match(),
            Command::EndTest => self.end_test(),
            Command::Retry => return self.retry_test(),
            Command::NewTest => self.new_test(),
        }
        Ok(())
    }

    /// Closes the trial on screen. The first call per trial wins; anything
    /// arriving outside a presentation is dropped.
    pub fn handle_response(&mut self, kind: ResponseKind) {
        if !self.phase.allows_input() || self.trial_index >= self.sequence.len() {
            trace!(?kind, phase = ?self.phase, "late response ignored");
            return;
        }
        let (index, presented_at) = match &self.current {
            Some(trial) if trial.phase.accepts_response() => (trial.index, trial.presented_at),
            _ => {
                trace!(?kind, index = self.trial_index, "response outside presentation ignored");
                return;
            }
        };

        self.pending = None;

        let reaction_time_ms = kind
            .is_subject_signal()
            .then(|| self.timer.elapsed(presented_at).as_millis() as u64);
        let response = TrialResponse {
            trial_index: index,
            is_target: self.sequence.is_target(index),
            user_responded: kind.user_responded(),
            reaction_time_ms,
        };
        let outcome = response.outcome();
        self.responses.push(response);
        if let Some(trial) = self.current.as_mut() {
            trial.phase = TrialPhase::Gap;
        }
        self.trial_index += 1;

        debug!(index, ?kind, ?outcome, rt_ms = ?reaction_time_ms, "trial closed");
        self.outbox.push(RunnerEvent::FeedbackReady { index, outcome });
        self.arm(TimerKind::InterTrialGap, INTER_TRIAL_GAP_MS);
    }

    /// Fires the pending timer if it is due and drains queued events.
    pub fn update(&mut self) -> Vec<RunnerEvent> {
        let now = self.timer.now();
        if let Some(pending) = self.pending.filter(|p| p.is_due(now)) {
            self.pending = None;
            match pending.kind {
                TimerKind::ResponseWindow => self.handle_response(ResponseKind::Timeout),
                TimerKind::InterTrialGap => self.advance(),
            }
        }
        std::mem::take(&mut self.outbox)
    }

    /// Deadline of the outstanding timer, in timer nanoseconds
    pub fn next_deadline_ns(&self) -> Option<u64> {
        self.pending.map(|p| p.deadline_ns)
    }

    /// A signal that lands after the countdown ran out, but before the
    /// owner polled, loses to the timeout.
    fn expire_response_window(&mut self) {
        let now = self.timer.now();
        let expired = self
            .pending
            .is_some_and(|p| p.kind == TimerKind::ResponseWindow && p.is_due(now));
        if expired {
            self.pending = None;
            self.handle_response(ResponseKind::Timeout);
        }
    }

    fn arm(&mut self, kind: TimerKind, delay_ms: u64) {
        let deadline_ns = self.timer.now().saturating_add(delay_ms.saturating_mul(NS_PER_MS));
        self.pending = Some(PendingTimer { kind, deadline_ns });
    }

    fn advance(&mut self) {
        if !self.phase.is_running() {
            return;
        }
        if self.trial_index >= self.sequence.len() {
            info!(total = self.responses.len(), "all trials completed");
            self.finish();
        } else {
            self.present_trial();
        }
    }

    fn present_trial(&mut self) {
        let index = self.trial_index;
        let Some(stimulus) = self.sequence.get(index) else {
            self.finish();
            return;
        };
        let now = self.timer.now();
        self.current = Some(ActiveTrial::new(index, stimulus, now));
        self.arm(TimerKind::ResponseWindow, self.stimulus_duration_ms());

        debug!(index, %stimulus, "trial presented");
        self.outbox.push(RunnerEvent::TrialPresented {
            index,
            stimulus,
            total_trials: self.sequence.len(),
        });
    }

    fn finish(&mut self) {
        self.pending = None;
        self.current = None;
        self.phase = SessionPhase::Finished;

        let report = SessionReport::new(self.config.clone().unwrap_or_default(), self.responses.clone());
        let summary = report.summary;
        info!(
            hits = summary.hits,
            misses = summary.misses,
            false_alarms = summary.false_alarms,
            correct_rejections = summary.correct_rejections,
            accuracy = summary.accuracy_percent,
            "test finished"
        );
        self.report = Some(report);
        self.outbox.push(RunnerEvent::TestFinished(summary));
    }

    fn stimulus_duration_ms(&self) -> u64 {
        self.config.as_ref().map_or(0, |c| c.stimulus_duration_ms)
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn config(&self) -> Option<&NBackConfig> {
        self.config.as_ref()
    }

    /// Stimulus currently on screen, if a presentation is in progress
    pub fn current_stimulus(&self) -> Option<Stimulus> {
        self.current
            .as_ref()
            .filter(|t| t.phase.accepts_response())
            .map(|t| t.stimulus)
    }

    /// (1-based trial number, total) while running
    pub fn progress(&self) -> Option<(usize, usize)> {
        if !self.phase.is_running() {
            return None;
        }
        let total = self.sequence.len();
        Some(((self.trial_index + 1).min(total), total))
    }

    /// Report of the most recently finished session
    pub fn last_report(&self) -> Option<&SessionReport> {
        self.report.as_ref()
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}
