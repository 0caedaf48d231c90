use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, sleep};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use staticlink_core::InspectError;

use crate::env::sanitize_env;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One invocation of an inspection tool.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub binary: PathBuf,
    pub timeout: Duration,
}

/// Captured result of a tool that ran to completion.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// stdout followed by stderr; some tools report on either stream.
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }

    /// Text to show when the tool reports a failure.
    pub fn failure_text(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        format!("exited with {}", self.status)
    }
}

/// Owns a running child and, on unix, the process group it leads. Dropping
/// the guard kills the whole group and reaps the child unless it was already
/// waited on.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }

    fn wait_until(&mut self, deadline: Instant) -> io::Result<Option<ExitStatus>> {
        loop {
            if let Some(status) = self.child.try_wait()? {
                self.reaped = true;
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            sleep(POLL_INTERVAL);
        }
    }

    #[cfg(unix)]
    fn kill_tree(&mut self) {
        // The child was spawned with `process_group(0)`, so its pid is the
        // group id and every process it started shares that group.
        let pgid = self.child.id() as libc::pid_t;
        if unsafe { libc::killpg(pgid, libc::SIGKILL) } != 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() != Some(libc::ESRCH) {
                debug!(error = %err, pgid, "kill inspection tool group");
            }
        }
    }

    #[cfg(not(unix))]
    fn kill_tree(&mut self) {
        if self.reaped {
            return;
        }
        if let Err(err) = self.child.kill() {
            debug!(error = %err, "kill inspection tool");
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.kill_tree();
        if self.reaped {
            return;
        }
        if let Err(err) = self.child.wait() {
            warn!(error = %err, "reap inspection tool");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

type Chunk = (Stream, io::Result<Vec<u8>>);

/// Both output streams, read to end.
#[derive(Default)]
struct Captured {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl ToolCommand {
    pub fn new(program: &str, args: &[&str], binary: PathBuf, timeout: Duration) -> Self {
        let mut all_args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        all_args.push(binary.to_string_lossy().into_owned());
        Self {
            program: program.to_string(),
            args: all_args,
            binary,
            timeout,
        }
    }

    /// Runs the tool to completion or until the timeout, whichever is first.
    ///
    /// The deadline covers both the tool's exit and the end of its output, so
    /// a background process holding a pipe open cannot stall the caller.
    /// Output pipes are drained on helper threads so a verbose tool cannot
    /// block on a full pipe while we wait for it.
    pub fn run(&self) -> Result<ToolOutput, InspectError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        sanitize_env(&mut command);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        debug!(program = %self.program, args = ?self.args, timeout = ?self.timeout, "spawn inspection tool");
        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut child = command.spawn().map_err(|err| self.spawn_error(err))?;
        let (sender, receiver) = mpsc::channel();
        let mut streams = 0;
        if let Some(stdout) = child.stdout.take() {
            drain(stdout, Stream::Stdout, sender.clone());
            streams += 1;
        }
        if let Some(stderr) = child.stderr.take() {
            drain(stderr, Stream::Stderr, sender);
            streams += 1;
        }
        // Dropping the guard on any return path kills the tool's process
        // group. Reader threads finish once the pipes close.
        let mut guard = ChildGuard::new(child);

        let status = guard
            .wait_until(deadline)
            .map_err(|err| self.tool_error(format!("wait: {err}")))?;
        let Some(status) = status else {
            return Err(self.timed_out("tool still running"));
        };
        let Some(captured) = collect_until(&receiver, streams, deadline)
            .map_err(|err| self.tool_error(format!("read output: {err}")))?
        else {
            return Err(self.timed_out("output still open after exit"));
        };

        let stdout = String::from_utf8_lossy(&captured.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&captured.stderr).into_owned();
        debug!(
            program = %self.program,
            %status,
            elapsed = ?started.elapsed(),
            stdout_bytes = stdout.len(),
            "inspection tool finished"
        );
        Ok(ToolOutput {
            status,
            stdout,
            stderr,
        })
    }

    fn timed_out(&self, reason: &str) -> InspectError {
        warn!(program = %self.program, timeout = ?self.timeout, reason, "inspection tool timed out");
        InspectError::Timeout {
            tool: self.program.clone(),
            seconds: self.timeout.as_secs(),
        }
    }

    fn spawn_error(&self, err: io::Error) -> InspectError {
        if err.kind() == io::ErrorKind::NotFound {
            InspectError::ToolUnavailable {
                tool: self.program.clone(),
            }
        } else {
            self.tool_error(format!("launch: {err}"))
        }
    }

    fn tool_error(&self, message: String) -> InspectError {
        InspectError::ToolError {
            tool: self.program.clone(),
            message,
        }
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R, stream: Stream, sender: Sender<Chunk>) {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let result = reader.read_to_end(&mut buffer).map(|_| buffer);
        // The receiver is gone once the run gave up; nothing left to report to.
        let _ = sender.send((stream, result));
    });
}

/// Waits for `streams` readers to hit end of file. `None` when the deadline
/// passes first.
fn collect_until(
    receiver: &Receiver<Chunk>,
    streams: usize,
    deadline: Instant,
) -> io::Result<Option<Captured>> {
    let mut captured = Captured::default();
    for _ in 0..streams {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let (stream, bytes) = match receiver.recv_timeout(remaining) {
            Ok(chunk) => chunk,
            Err(RecvTimeoutError::Timeout) => return Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(io::Error::new(io::ErrorKind::Other, "output reader panicked"))
            }
        };
        match stream {
            Stream::Stdout => captured.stdout = bytes?,
            Stream::Stderr => captured.stderr = bytes?,
        }
    }
    Ok(Some(captured))
}
