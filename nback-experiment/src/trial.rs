use nback_core::{Stimulus, TrialPhase};

/// Trial currently on screen (or in its feedback gap)
#[derive(Debug, Clone)]
pub struct ActiveTrial<T> {
    pub index: usize,
    pub stimulus: Stimulus,
    pub phase: TrialPhase,
    pub presented_at: T,
}

impl<T> ActiveTrial<T> {
    pub fn new(index: usize, stimulus: Stimulus, presented_at: T) -> Self {
        Self {
            index,
            stimulus,
            phase: TrialPhase::Presentation,
            presented_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Stimulus countdown; firing injects a no-response timeout
    ResponseWindow,
    /// Feedback pause before the next presentation
    InterTrialGap,
}

/// The single outstanding timer a runner may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub kind: TimerKind,
    pub deadline_ns: u64,
}

impl PendingTimer {
    pub fn is_due(&self, now_ns: u64) -> bool {
        now_ns >= self.deadline_ns
    }
}
