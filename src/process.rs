//! Bounded execution of short-lived helper processes.
//!
//! The child's stdout is drained on a helper thread while the calling thread
//! keeps ownership of the `Child` handle, so it can kill and reap it when the
//! deadline passes. Stdin and stderr are always redirected to null.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const REAP_TIMEOUT: Duration = Duration::from_secs(2);
const JOIN_TIMEOUT: Duration = Duration::from_millis(200);

/// Upper bound on captured stdout.
const MAX_OUTPUT_BYTES: u64 = 64 * 1024;

/// Exit status and captured stdout of a finished helper.
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: String,
}

/// Runs `command` to completion, killing it if it outlives `timeout`.
///
/// A timeout surfaces as an [`io::ErrorKind::TimedOut`] error.
pub fn run_bounded(mut command: Command, timeout: Duration) -> io::Result<CapturedOutput> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());

    let mut child = command.spawn()?;
    let Some(stdout) = child.stdout.take() else {
        reap(&mut child);
        return Err(io::Error::new(io::ErrorKind::Other, "child stdout unavailable"));
    };

    let reader = thread::spawn(move || {
        let mut buf = Vec::new();
        stdout.take(MAX_OUTPUT_BYTES).read_to_end(&mut buf).map(|_| buf)
    });

    let deadline = Instant::now() + timeout;
    let mut exited = None;
    let status = loop {
        if exited.is_none() {
            exited = child.try_wait()?;
        }
        // A grandchild that inherited stdout keeps the reader blocked after
        // the child itself has exited, so both count against the deadline.
        if let Some(status) = exited {
            if reader.is_finished() {
                break status;
            }
        }
        if Instant::now() >= deadline {
            tracing::debug!(?timeout, "helper process timed out, killing it");
            if exited.is_none() {
                reap(&mut child);
            }
            drop(child);
            join_bounded(reader);
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("process did not finish within {:?}", timeout),
            ));
        }
        thread::sleep(POLL_INTERVAL);
    };

    let bytes = reader
        .join()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "stdout reader panicked"))??;

    Ok(CapturedOutput {
        status,
        stdout: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// Gives the reader a short grace period, then abandons it to the pipe.
fn join_bounded(reader: JoinHandle<io::Result<Vec<u8>>>) {
    let deadline = Instant::now() + JOIN_TIMEOUT;
    while Instant::now() < deadline {
        if reader.is_finished() {
            let _ = reader.join();
            return;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kills the child and waits a bounded time for it to exit.
fn reap(child: &mut Child) {
    let _ = child.kill();
    let deadline = Instant::now() + REAP_TIMEOUT;
    while Instant::now() < deadline {
        match child.try_wait() {
            Ok(Some(_)) | Err(_) => return,
            Ok(None) => thread::sleep(POLL_INTERVAL),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo hello; echo noise >&2"]);
        let out = run_bounded(cmd, Duration::from_secs(10)).unwrap();
        assert!(out.status.success());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn test_reports_failure_status() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "exit 3"]);
        let out = run_bounded(cmd, Duration::from_secs(10)).unwrap();
        assert_eq!(out.status.code(), Some(3));
    }

    #[test]
    fn test_kills_hung_child() {
        let mut cmd = Command::new("sleep");
        cmd.arg("30");
        let started = Instant::now();
        let err = run_bounded(cmd, Duration::from_millis(100)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_background_grandchild_does_not_extend_deadline() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "sleep 30 & echo hi"]);
        let started = Instant::now();
        let err = run_bounded(cmd, Duration::from_millis(200)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_missing_program() {
        let cmd = Command::new("dist-stamp-no-such-program");
        let err = run_bounded(cmd, Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
