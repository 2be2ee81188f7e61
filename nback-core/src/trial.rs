use serde::{Deserialize, Serialize};

/// Signal-detection class of a closed trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Hit,
    Miss,
    FalseAlarm,
    CorrectRejection,
}

impl Outcome {
    pub fn classify(is_target: bool, user_responded: bool) -> Self {
        match (is_target, user_responded) {
            (true, true) => Outcome::Hit,
            (true, false) => Outcome::Miss,
            (false, true) => Outcome::FalseAlarm,
            (false, false) => Outcome::CorrectRejection,
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Outcome::Hit | Outcome::CorrectRejection)
    }

    /// Short feedback text shown right after the trial closes
    pub fn feedback_text(&self) -> &'static str {
        match self {
            Outcome::Hit => "✓ Correct!",
            Outcome::CorrectRejection => "✓ Correct",
            Outcome::Miss => "✗ Miss",
            Outcome::FalseAlarm => "✗ False Alarm",
        }
    }
}

/// Recorded result per trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialResponse {
    pub trial_index: usize,
    pub is_target: bool,
    pub user_responded: bool,
    /// Absent when the trial closed on timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_time_ms: Option<u64>,
}

impl TrialResponse {
    pub fn outcome(&self) -> Outcome {
        Outcome::classify(self.is_target, self.user_responded)
    }

    pub fn timed_out(&self) -> bool {
        self.reaction_time_ms.is_none()
    }
}
