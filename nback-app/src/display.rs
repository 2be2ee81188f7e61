//! Plain-text rendering of stimuli and results for the terminal.

use nback_core::Stimulus;
use nback_experiment::ResultsSummary;

pub fn trial_header(index: usize, total: usize, n: usize) -> String {
    format!("N-Back: {n}    Trial {} / {total}", index + 1)
}

pub fn render_stimulus(stimulus: Stimulus) -> String {
    match stimulus.grid_coords() {
        Some((row, col)) => (0..3)
            .map(|r| {
                (0..3)
                    .map(|c| if (r, c) == (row, col) { "■" } else { "□" })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .map(|line| format!("    {line}"))
            .collect::<Vec<_>>()
            .join("\n"),
        None => format!("    [ {stimulus} ]"),
    }
}

pub fn results(summary: &ResultsSummary) -> String {
    format!("\n=== RESULTS ===\n{summary}\n")
}
