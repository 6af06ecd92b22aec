//! Install-time sequencing of the two bundled installers.
//!
//! The first installer runs attended. The second runs only when the first
//! exits with code 0, and its own result never changes the outcome.
//!
//! ```text
//! Start -> FirstRunning -> FirstSucceeded -> SecondRunning -> Done
//!               |
//!               +-> Aborted
//! ```

mod install;
pub mod manifest;
pub mod payload;
mod runner;

pub use install::Installation;
pub use manifest::{BundleManifest, InstallerEntry};
pub use runner::{InstallerRunner, ProcessRunner};

use std::path::PathBuf;

/// Sequencer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    Start,
    FirstRunning,
    FirstSucceeded,
    SecondRunning,
    Done,
    Aborted,
}

impl SequenceState {
    /// Whether `self -> next` is a legal transition.
    pub fn can_advance_to(self, next: SequenceState) -> bool {
        use SequenceState::*;
        matches!(
            (self, next),
            (Start, FirstRunning)
                | (FirstRunning, FirstSucceeded)
                | (FirstRunning, Aborted)
                | (FirstSucceeded, SecondRunning)
                | (SecondRunning, Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SequenceState::Done | SequenceState::Aborted)
    }
}

/// One installer launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    fn command_line(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of a completed sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceOutcome {
    /// Terminal state reached.
    pub state: SequenceState,
    /// States visited, starting with [`SequenceState::Start`].
    pub trace: Vec<SequenceState>,
    /// Exit code of the first installer, if it produced one.
    pub first_exit: Option<i32>,
    /// Exit code of the second installer, if it ran and produced one.
    pub second_exit: Option<i32>,
}

impl SequenceOutcome {
    /// Process exit status for the whole run.
    pub fn exit_code(&self) -> i32 {
        match self.state {
            SequenceState::Done => 0,
            _ => 1,
        }
    }
}

/// Drives the install-time state machine over an [`InstallerRunner`].
#[derive(Debug)]
pub struct Sequencer<R> {
    runner: R,
}

impl<R: InstallerRunner> Sequencer<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Runs `first`, then `second` if `first` exited with code 0.
    pub async fn run(&self, first: &Invocation, second: &Invocation) -> SequenceOutcome {
        let mut machine = Machine::default();
        let mut outcome_first = None;
        let mut outcome_second = None;

        machine.advance(SequenceState::FirstRunning);
        log::info!("Running installer: {}", first.command_line());
        match self.runner.run(&first.program, &first.args).await {
            Ok(Some(0)) => {
                outcome_first = Some(0);
                log::info!("Installer completed with return code: 0");
                machine.advance(SequenceState::FirstSucceeded);
            }
            Ok(Some(code)) => {
                outcome_first = Some(code);
                log::error!(
                    "Installer failed with return code {}; skipping {}",
                    code,
                    second.program.display()
                );
                machine.advance(SequenceState::Aborted);
            }
            Ok(None) => {
                log::error!("Installer was terminated without an exit code");
                machine.advance(SequenceState::Aborted);
            }
            Err(e) => {
                log::error!("Failed to launch {}: {}", first.program.display(), e);
                machine.advance(SequenceState::Aborted);
            }
        }

        if machine.state == SequenceState::FirstSucceeded {
            machine.advance(SequenceState::SecondRunning);
            log::info!("Running installer: {}", second.command_line());
            match self.runner.run(&second.program, &second.args).await {
                Ok(Some(0)) => {
                    outcome_second = Some(0);
                    log::info!("Installer completed with return code: 0");
                }
                Ok(code) => {
                    outcome_second = code;
                    log::warn!(
                        "Second installer finished with return code {:?}; continuing",
                        code
                    );
                }
                Err(e) => {
                    log::warn!("Failed to launch {}: {}", second.program.display(), e);
                }
            }
            machine.advance(SequenceState::Done);
        }

        debug_assert!(machine.state.is_terminal());
        SequenceOutcome {
            state: machine.state,
            trace: machine.trace,
            first_exit: outcome_first,
            second_exit: outcome_second,
        }
    }
}

#[derive(Debug)]
struct Machine {
    state: SequenceState,
    trace: Vec<SequenceState>,
}

impl Default for Machine {
    fn default() -> Self {
        Self {
            state: SequenceState::Start,
            trace: vec![SequenceState::Start],
        }
    }
}

impl Machine {
    fn advance(&mut self, next: SequenceState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        log::debug!("Sequencer: {:?} -> {:?}", self.state, next);
        self.state = next;
        self.trace.push(next);
    }
}
