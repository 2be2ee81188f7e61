//! Signal-detection summary over a session's response log.

use std::fmt;

use nback_core::{Outcome, TrialResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultsSummary {
    pub hits: u32,
    pub misses: u32,
    pub false_alarms: u32,
    pub correct_rejections: u32,
    /// Hit rate among target trials, rounded to a whole percent
    pub accuracy_percent: u32,
    /// Mean over hits that carry a reaction time
    pub mean_reaction_time_ms: Option<f64>,
}

impl ResultsSummary {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_responses(responses: &[TrialResponse]) -> Self {
        let mut summary = Self::default();
        let mut rt_total = 0u64;
        let mut rt_count = 0u64;

        for response in responses {
            match response.outcome() {
                Outcome::Hit => {
                    summary.hits = summary.hits.saturating_add(1);
                    if let Some(rt) = response.reaction_time_ms {
                        rt_total = rt_total.saturating_add(rt);
                        rt_count += 1;
                    }
                }
                Outcome::Miss => summary.misses = summary.misses.saturating_add(1),
                Outcome::FalseAlarm => {
                    summary.false_alarms = summary.false_alarms.saturating_add(1)
                }
                Outcome::CorrectRejection => {
                    summary.correct_rejections = summary.correct_rejections.saturating_add(1)
                }
            }
        }

        let targets = summary.hits + summary.misses;
        if targets > 0 {
            summary.accuracy_percent =
                (100.0 * summary.hits as f64 / targets as f64).round() as u32;
        }
        if rt_count > 0 {
            summary.mean_reaction_time_ms = Some(rt_total as f64 / rt_count as f64);
        }

        summary
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses + self.false_alarms + self.correct_rejections
    }

    /// Mean reaction time rounded to whole milliseconds. `N/A` when there
    /// is no mean or it is not positive.
    pub fn reaction_time_label(&self) -> String {
        match self.mean_reaction_time_ms {
            Some(ms) if ms > 0.0 => format!("{} ms", ms.round() as u64),
            _ => "N/A".to_string(),
        }
    }
}

impl fmt::Display for ResultsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy:           {}%", self.accuracy_percent)?;
        writeln!(f, "Hits:               {}", self.hits)?;
        writeln!(f, "Misses:             {}", self.misses)?;
        writeln!(f, "False alarms:       {}", self.false_alarms)?;
        writeln!(f, "Correct rejections: {}", self.correct_rejections)?;
        write!(f, "Mean reaction time: {}", self.reaction_time_label())
    }
}
