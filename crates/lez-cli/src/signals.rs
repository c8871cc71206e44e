//! Ctrl+C handling.
//!
//! A watcher thread receives SIGINT through `signal_hook::iterator`. While an
//! engine invocation is running the signal only raises a flag: the process
//! executor kills the engine and the caller winds down. At the session prompt
//! the watcher says goodbye and ends the process; anywhere else it exits
//! with the conventional interrupted status.

use std::io::{self, Write};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use signal_hook::consts::SIGINT;
use signal_hook::iterator::Signals;
use tracing::{debug, info};

use crate::AppError;
use crate::console::FAREWELL;

const SIGNALS_TARGET: &str = "lez_cli::signals";

/// Exit status for a process ended by SIGINT outside a session.
const INTERRUPTED_STATUS: i32 = 130;

/// What a SIGINT should do given the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InterruptAction {
    Cancel,
    Farewell,
    Abort,
}

#[derive(Debug, Clone)]
pub(crate) struct Interrupts {
    raised: Arc<AtomicBool>,
    idle: Arc<AtomicBool>,
    in_session: Arc<AtomicBool>,
}

impl Interrupts {
    /// Flags that no signal handler will ever raise.
    pub(crate) fn detached() -> Self {
        Self {
            raised: Arc::new(AtomicBool::new(false)),
            idle: Arc::new(AtomicBool::new(true)),
            in_session: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Starts the SIGINT watcher thread for this process.
    pub(crate) fn install() -> Result<Self, AppError> {
        let interrupts = Self::detached();
        let mut signals = Signals::new([SIGINT]).map_err(AppError::InstallSignalHandler)?;
        let watcher = interrupts.clone();
        thread::Builder::new()
            .name(String::from("lez-signals"))
            .spawn(move || {
                for signal in signals.forever() {
                    match watcher.react() {
                        InterruptAction::Cancel => {
                            info!(target: SIGNALS_TARGET, signal, "cancelling running query");
                        }
                        InterruptAction::Farewell => {
                            write_farewell();
                            process::exit(0);
                        }
                        InterruptAction::Abort => process::exit(INTERRUPTED_STATUS),
                    }
                }
            })
            .map_err(AppError::InstallSignalHandler)?;
        debug!(target: SIGNALS_TARGET, "installed interrupt handler");
        Ok(interrupts)
    }

    /// The flag the process executor polls while an engine child runs.
    pub(crate) fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.raised)
    }

    pub(crate) fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    /// Marks the interactive prompt loop as running.
    pub(crate) fn enter_session(&self) {
        self.in_session.store(true, Ordering::SeqCst);
    }

    /// Runs `work` with SIGINT redirected to the interrupt flag.
    pub(crate) fn while_busy<T>(&self, work: impl FnOnce() -> T) -> T {
        self.idle.store(false, Ordering::SeqCst);
        let result = work();
        self.idle.store(true, Ordering::SeqCst);
        result
    }

    /// Records a SIGINT and decides how to respond to it.
    pub(crate) fn react(&self) -> InterruptAction {
        self.raised.store(true, Ordering::SeqCst);
        if !self.idle.load(Ordering::SeqCst) {
            InterruptAction::Cancel
        } else if self.in_session.load(Ordering::SeqCst) {
            InterruptAction::Farewell
        } else {
            InterruptAction::Abort
        }
    }

    #[cfg(test)]
    pub(crate) fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        self.idle.load(Ordering::SeqCst)
    }
}

/// Writes through a duplicate of fd 1; the main thread may hold the stdout
/// lock while it blocks on input.
#[cfg(unix)]
fn write_farewell() {
    use std::fs::File;
    use std::os::fd::AsFd;

    let Ok(fd) = io::stdout().as_fd().try_clone_to_owned() else {
        return;
    };
    let mut stdout = File::from(fd);
    drop(writeln!(stdout, "\n{FAREWELL}"));
}

#[cfg(not(unix))]
fn write_farewell() {
    drop(writeln!(io::stderr(), "\n{FAREWELL}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_section_clears_idle_flag_and_restores_it() {
        let interrupts = Interrupts::detached();
        let observed = interrupts.while_busy(|| interrupts.is_idle());
        assert!(!observed);
        assert!(interrupts.is_idle());
    }

    #[test]
    fn raised_flag_is_shared_with_executor() {
        let interrupts = Interrupts::detached();
        let flag = interrupts.flag();
        interrupts.raise();
        assert!(flag.load(Ordering::SeqCst));
        assert!(interrupts.is_raised());
    }

    #[test]
    fn interrupt_during_a_query_cancels_it() {
        let interrupts = Interrupts::detached();
        interrupts.enter_session();
        let action = interrupts.while_busy(|| interrupts.react());
        assert_eq!(action, InterruptAction::Cancel);
        assert!(interrupts.is_raised());
    }

    #[test]
    fn interrupt_at_the_prompt_says_goodbye() {
        let interrupts = Interrupts::detached();
        interrupts.enter_session();
        assert_eq!(interrupts.react(), InterruptAction::Farewell);
    }

    #[test]
    fn interrupt_outside_a_session_aborts() {
        let interrupts = Interrupts::detached();
        assert_eq!(interrupts.react(), InterruptAction::Abort);
    }
}
