use anyhow::Result;
use nback_core::SessionPhase;
use nback_experiment::{Command, NBackConfig, RunnerEvent, TrialRunner};
use nback_timing::{HighPrecisionTimer, Timer};
use rand::rngs::ThreadRng;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use crate::display;

const IDLE_POLL: Duration = Duration::from_millis(250);
/// Final stretch before a deadline that is slept on the timer instead of
/// the channel, whose wakeups can overshoot by a scheduler tick
const PRECISE_TAIL: Duration = Duration::from_millis(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wait {
    /// Block on stdin for at most this long
    Listen(Duration),
    /// Deadline is close: sleep on the timer, then poll the runner
    Sleep(Duration),
}

impl Wait {
    fn until(remaining: Option<Duration>) -> Self {
        match remaining {
            None => Wait::Listen(IDLE_POLL),
            Some(d) if d <= PRECISE_TAIL => Wait::Sleep(d),
            Some(d) => Wait::Listen(d - PRECISE_TAIL),
        }
    }
}

/// Line-oriented terminal session. Stdin is read on a helper thread so the
/// runner's timers keep firing while the subject is silent.
pub struct App {
    runner: TrialRunner<HighPrecisionTimer, ThreadRng>,
    config: NBackConfig,
    output: Option<PathBuf>,
    input: Receiver<String>,
    should_exit: bool,
}

impl App {
    pub fn new(config: NBackConfig, output: Option<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        Self {
            runner: TrialRunner::new(HighPrecisionTimer::new(), rand::rng()),
            config,
            output,
            input: rx,
            should_exit: false,
        }
    }

    pub fn run(mut self) -> Result<()> {
        println!("=== N-BACK TEST ===");
        println!(
            "Press ENTER (or m) when the stimulus matches the one {} back, x for no match, q to stop early.",
            self.config.n
        );
        println!("Press ENTER to start.");

        while !self.should_exit {
            self.update()?;
            self.wait_for_input()?;
        }
        Ok(())
    }

    fn update(&mut self) -> Result<()> {
        for event in self.runner.update() {
            self.render(event)?;
        }
        Ok(())
    }

    fn render(&mut self, event: RunnerEvent) -> Result<()> {
        match event {
            RunnerEvent::TrialPresented {
                index,
                stimulus,
                total_trials,
            } => {
                println!();
                println!("{}", display::trial_header(index, total_trials, self.config.n));
                println!("{}", display::render_stimulus(stimulus));
            }
            RunnerEvent::FeedbackReady { outcome, .. } => {
                println!("    {}", outcome.feedback_text());
            }
            RunnerEvent::TestFinished(summary) => {
                println!("{}", display::results(&summary));
                if let (Some(path), Some(report)) = (&self.output, self.runner.last_report()) {
                    crate::write_report(path, report)?;
                }
                println!("r = retry, n = new test, q = quit");
            }
        }
        Ok(())
    }

    /// Blocks until input arrives or the runner's next deadline passes.
    fn wait_for_input(&mut self) -> Result<()> {
        let timer = self.runner.timer();
        let remaining = self
            .runner
            .next_deadline_ns()
            .map(|deadline| Duration::from_nanos(deadline.saturating_sub(timer.now())));

        let timeout = match Wait::until(remaining) {
            Wait::Listen(timeout) => timeout,
            Wait::Sleep(d) => {
                timer.sleep(d);
                return Ok(());
            }
        };

        match self.input.recv_timeout(timeout) {
            Ok(line) => self.handle_input(line.trim()),
            Err(RecvTimeoutError::Timeout) => Ok(()),
            Err(RecvTimeoutError::Disconnected) => {
                debug!("stdin closed");
                self.runner.end_test();
                self.update()?;
                self.should_exit = true;
                Ok(())
            }
        }
    }

    fn handle_input(&mut self, key: &str) -> Result<()> {
        let key = key.to_ascii_lowercase();
        match self.runner.phase() {
            SessionPhase::Running => {
                let command = match key.as_str() {
                    "" | "m" => Command::SignalMatch,
                    "x" => Command::SignalNoMatch,
                    "q" => Command::EndTest,
                    other => {
                        warn!(key = other, "unrecognised key during test");
                        return Ok(());
                    }
                };
                self.runner.handle_command(command)?;
            }
            SessionPhase::Finished => match key.as_str() {
                "r" => self.runner.handle_command(Command::Retry)?,
                "n" => {
                    self.runner.handle_command(Command::NewTest)?;
                    println!("Press ENTER to start a new test, q to quit.");
                }
                "q" => self.should_exit = true,
                _ => println!("r = retry, n = new test, q = quit"),
            },
            SessionPhase::Idle => match key.as_str() {
                "" => self.runner.start_test(self.config.clone())?,
                "q" => self.should_exit = true,
                _ => println!("Press ENTER to start, q to quit."),
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_runner_polls_stdin() {
        assert_eq!(Wait::until(None), Wait::Listen(IDLE_POLL));
    }

    #[test]
    fn far_deadline_listens_until_the_tail() {
        assert_eq!(
            Wait::until(Some(Duration::from_millis(500))),
            Wait::Listen(Duration::from_millis(498))
        );
    }

    #[test]
    fn near_deadline_sleeps_precisely() {
        assert_eq!(
            Wait::until(Some(Duration::from_micros(1500))),
            Wait::Sleep(Duration::from_micros(1500))
        );
        assert_eq!(Wait::until(Some(Duration::ZERO)), Wait::Sleep(Duration::ZERO));
    }

    #[test]
    fn precise_sleep_reaches_the_deadline() {
        let timer = HighPrecisionTimer::new();
        let deadline = timer.now() + PRECISE_TAIL.as_nanos() as u64;
        let remaining = Duration::from_nanos(deadline.saturating_sub(timer.now()));
        match Wait::until(Some(remaining)) {
            Wait::Sleep(d) => timer.sleep(d),
            other => panic!("expected a sleep, got {other:?}"),
        }
        assert!(timer.now() >= deadline);
    }
}
