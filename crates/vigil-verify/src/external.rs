// external.rs — Bounded external verification command.
//
// The policy may name a verification command (e.g., a test or lint runner).
// It is spawned through `sh -c`, polled until it exits or the deadline
// passes, and killed on overrun. Exceeding the deadline is treated as
// failure, never as absence: once a check starts, only a clean exit counts.

use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Outcome of the external verification command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalCheck {
    /// The command exited zero.
    Passed,
    /// The command exited non-zero.
    Failed { exit_code: Option<i32> },
    /// The command exceeded the deadline and was killed.
    TimedOut,
    /// The command could not be spawned at all.
    SpawnError { message: String },
}

/// Poll interval while waiting for the child to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run a verification command under a deadline.
pub fn run_external_check(command: &str, timeout: Duration) -> ExternalCheck {
    let mut child = match Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            return ExternalCheck::SpawnError {
                message: e.to_string(),
            }
        }
    };

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return if status.success() {
                    ExternalCheck::Passed
                } else {
                    tracing::warn!(command, code = ?status.code(), "verification command failed");
                    ExternalCheck::Failed {
                        exit_code: status.code(),
                    }
                };
            }
            Ok(None) => {
                if Instant::now() >= deadline {
                    // Overrun: kill and report timeout. The kill result is
                    // irrelevant; the check already failed.
                    let _ = child.kill();
                    let _ = child.wait();
                    tracing::warn!(command, "verification command timed out");
                    return ExternalCheck::TimedOut;
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                return ExternalCheck::SpawnError {
                    message: e.to_string(),
                }
            }
        }
    }
}
