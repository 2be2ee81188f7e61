use nback_core::TrialResponse;
use serde::{Deserialize, Serialize};

use crate::config::NBackConfig;
use crate::scoring::ResultsSummary;

/// Everything recorded for one finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub config: NBackConfig,
    pub responses: Vec<TrialResponse>,
    pub summary: ResultsSummary,
}

impl SessionReport {
    pub fn new(config: NBackConfig, responses: Vec<TrialResponse>) -> Self {
        let summary = ResultsSummary::from_responses(&responses);
        Self {
            config,
            responses,
            summary,
        }
    }

    /// Whether the session was ended before every trial was attempted
    pub fn ended_early(&self) -> bool {
        self.responses.len() < self.config.trial_count
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nback_core::StimulusKind;

    #[test]
    fn json_export_carries_config_log_and_summary() {
        let config = NBackConfig::new(1, 3, StimulusKind::Digits, 800).unwrap();
        let responses = vec![
            TrialResponse {
                trial_index: 0,
                is_target: false,
                user_responded: false,
                reaction_time_ms: None,
            },
            TrialResponse {
                trial_index: 1,
                is_target: true,
                user_responded: true,
                reaction_time_ms: Some(512),
            },
        ];
        let report = SessionReport::new(config, responses);
        assert!(report.ended_early());
        assert_eq!(report.summary.hits, 1);

        let json: serde_json::Value =
            serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["config"]["stimulus_kind"], "digits");
        assert_eq!(json["responses"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["responses"][1]["reaction_time_ms"], 512);
        assert_eq!(json["summary"]["mean_reaction_time_ms"], 512.0);
    }
}
