//! Subprocess execution of the inference engine.
//!
//! [`ProcessExecutor`] implements [`EngineExecutor`] by spawning a fresh
//! child for every invocation with stdin closed and both output streams
//! piped. The streams are drained on reader threads so a chatty engine can
//! never block on a full pipe, while the calling thread polls for exit.
//! Polling is where the optional timeout and the interrupt flag are
//! enforced. On Unix the child leads its own process group; the guard kills
//! the whole group and reaps the child on every exit path, so no invocation
//! leaves the engine or anything it started behind.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::EngineError;
use crate::invoke::{EngineExecutor, EngineInvocation, InvocationResult, Termination};

/// Tracing target for engine process operations.
const PROCESS_TARGET: &str = "lez_engine::process";

/// Delay between exit polls.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long to keep draining output once the process group is gone.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

type StreamReader = Receiver<io::Result<Vec<u8>>>;

/// Executes engine invocations as isolated child processes.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
///
/// use lez_engine::process::ProcessExecutor;
/// use lez_engine::{EngineExecutor, EngineInvocation};
///
/// let executor = ProcessExecutor::new().with_timeout(Some(Duration::from_secs(30)));
/// let result = executor.run(&EngineInvocation::version("swipl"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    timeout: Option<Duration>,
    interrupt: Option<Arc<AtomicBool>>,
}

impl ProcessExecutor {
    /// Creates an executor with no timeout and no interrupt flag.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: None,
            interrupt: None,
        }
    }

    /// Bounds each invocation; `None` waits indefinitely.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Kills the running child as soon as `flag` becomes `true`.
    #[must_use]
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Configured timeout.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn wait(&self, program: &str, guard: &mut ChildGuard) -> Result<Termination, EngineError> {
        let start = Instant::now();
        loop {
            if let Some(status) = guard
                .try_wait()
                .map_err(|error| EngineError::io(program, error))?
            {
                return Ok(termination_from(status));
            }

            if self.interrupted() {
                warn!(
                    target: PROCESS_TARGET,
                    program,
                    "interrupt received, killing inference engine"
                );
                guard.terminate();
                return Ok(Termination::Interrupted);
            }

            if let Some(timeout) = self.timeout.filter(|limit| start.elapsed() >= *limit) {
                warn!(
                    target: PROCESS_TARGET,
                    program,
                    timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    "inference engine timed out, killing process"
                );
                guard.terminate();
                return Ok(Termination::TimedOut { after: timeout });
            }

            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl EngineExecutor for ProcessExecutor {
    fn run(&self, invocation: &EngineInvocation) -> Result<InvocationResult, EngineError> {
        let program = invocation.program();
        let mut command = Command::new(program);
        command
            .args(invocation.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        debug!(
            target: PROCESS_TARGET,
            program,
            args = ?invocation.args(),
            "spawning inference engine"
        );

        let child = command
            .spawn()
            .map_err(|error| EngineError::from_spawn(program, error))?;
        let mut guard = ChildGuard::new(child);
        debug!(target: PROCESS_TARGET, pid = guard.id(), "inference engine spawned");

        let stdout = capture(guard.child.stdout.take());
        let stderr = capture(guard.child.stderr.take());

        let termination = self.wait(program, &mut guard)?;
        // Descendants may still hold the pipes after a clean exit.
        guard.terminate();
        let stdout = collect(program, stdout)?;
        let stderr = collect(program, stderr)?;

        debug!(
            target: PROCESS_TARGET,
            program,
            ?termination,
            "inference engine exited"
        );
        Ok(InvocationResult::new(termination, stdout, stderr))
    }
}

/// Kills the child's process group and reaps the child.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    const fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }

    fn id(&self) -> u32 {
        self.child.id()
    }

    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        let status = self.child.try_wait()?;
        if status.is_some() {
            self.reaped = true;
        }
        Ok(status)
    }

    /// Safe to repeat; an already empty group is not an error.
    fn terminate(&mut self) {
        self.kill_group();
        if self.reaped {
            return;
        }
        drop(self.child.kill());
        drop(self.child.wait());
        self.reaped = true;
    }

    #[cfg(unix)]
    fn kill_group(&self) {
        use nix::errno::Errno;
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        let Ok(leader) = i32::try_from(self.child.id()) else {
            return;
        };
        match killpg(Pid::from_raw(leader), Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(error) => warn!(
                target: PROCESS_TARGET,
                pgid = leader,
                %error,
                "failed to kill inference engine process group"
            ),
        }
    }

    #[cfg(not(unix))]
    fn kill_group(&self) {}
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.terminate();
    }
}

fn capture<R>(stream: Option<R>) -> Option<StreamReader>
where
    R: Read + Send + 'static,
{
    stream.map(|mut reader| {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let result = reader.read_to_end(&mut buffer).map(|_| buffer);
            drop(sender.send(result));
        });
        receiver
    })
}

/// Called after the group is killed, so the pipe normally closes at once; a
/// writer that escaped the group forfeits its stream after [`DRAIN_GRACE`].
fn collect(program: &str, reader: Option<StreamReader>) -> Result<String, EngineError> {
    let Some(receiver) = reader else {
        return Ok(String::new());
    };
    let bytes = match receiver.recv_timeout(DRAIN_GRACE) {
        Ok(result) => result.map_err(|error| EngineError::io(program, error))?,
        Err(RecvTimeoutError::Timeout) => {
            warn!(
                target: PROCESS_TARGET,
                program,
                "output pipe still open after the engine finished, discarding it"
            );
            return Ok(String::new());
        }
        Err(RecvTimeoutError::Disconnected) => {
            return Err(EngineError::io(
                program,
                io::Error::other("output reader panicked"),
            ));
        }
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn termination_from(status: ExitStatus) -> Termination {
    match status.code() {
        Some(code) => Termination::Exited(code),
        None => Termination::Signalled {
            signal: signal_of(status),
        },
    }
}

#[cfg(unix)]
fn signal_of(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_status: ExitStatus) -> Option<i32> {
    None
}
