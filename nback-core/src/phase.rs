/// Lifecycle of one test session
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Waiting for configuration; also where `new_test` returns to
    #[default]
    Idle,
    Running,
    Finished,
}

impl SessionPhase {
    pub fn allows_input(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn can_start(&self) -> bool {
        !matches!(self, Self::Running)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// Where the current trial is within a running session
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum TrialPhase {
    /// Stimulus on screen, countdown armed
    Presentation,
    /// Feedback shown, waiting for the next presentation
    Gap,
}

impl TrialPhase {
    pub fn accepts_response(&self) -> bool {
        matches!(self, Self::Presentation)
    }
}
