//! Scoped Chrome processes.
//!
//! A [`Session`] owns the spawned child and its profile directory. Whatever
//! path a caller takes out of [`Session::wait`], dropping the session kills
//! and reaps the process before the profile directory is removed.
//!
//! On Unix the child leads its own process group (see `Chrome::launch`), so
//! helper processes Chrome forks are killed along with it and can never keep
//! the output pipes open past the deadline.

use crate::error::{ErrorKind, Result};
use std::io::Read;
use std::process::{Child, ExitStatus};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Time the reader threads get to hit EOF when the process exits right at the
/// deadline.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

type Reader = JoinHandle<std::io::Result<Vec<u8>>>;

/// Captured result of a Chrome process that exited on its own.
#[derive(Debug)]
pub(crate) struct Finished {
    pub(crate) status: ExitStatus,
    pub(crate) stdout: Vec<u8>,
    pub(crate) stderr: String,
}

pub(crate) struct Session {
    child: Child,
    // Field order matters: the profile must outlive the process using it,
    // and `Drop` below reaps the child before fields are dropped.
    _profile: TempDir,
}

impl Session {
    pub(crate) fn new(child: Child, profile: TempDir) -> Self {
        tracing::debug!(pid = child.id(), "Chrome session started");
        Self { child, _profile: profile }
    }

    /// Blocks until Chrome exits or `timeout` elapses.
    ///
    /// Output pipes are drained on background threads; Chrome writes a lot to
    /// stderr and would otherwise stall once the pipe buffer fills up.
    pub(crate) fn wait(mut self, timeout: Duration) -> Result<Finished> {
        let stdout = self.child.stdout.take().map(drain);
        let stderr = self.child.stderr.take().map(drain);
        let deadline = Instant::now() + timeout;
        let status = loop {
            if let Some(status) = self.child.try_wait().map_err(ErrorKind::from)? {
                break status;
            }
            if Instant::now() >= deadline {
                tracing::warn!(pid = self.child.id(), timeout = ?timeout, "Chrome timed out; killing session");
                exn::bail!(ErrorKind::ChromeTimeout(timeout));
            }
            thread::sleep(POLL_INTERVAL);
        };
        // Leftover helpers still hold the write ends of the pipes.
        self.kill_group();
        let drained_by = deadline.max(Instant::now() + DRAIN_GRACE);
        let stdout = collect(stdout, drained_by, timeout)?;
        let stderr = String::from_utf8_lossy(&collect(stderr, drained_by, timeout)?).into_owned();
        tracing::debug!(%status, stdout = stdout.len(), "Chrome session finished");
        Ok(Finished { status, stdout, stderr })
    }

    /// SIGKILLs every process in the child's group.
    #[cfg(unix)]
    fn kill_group(&mut self) {
        let Ok(pgid) = libc::pid_t::try_from(self.child.id()) else {
            return;
        };
        // SAFETY: killpg takes no pointers; a stale or empty group yields ESRCH.
        if unsafe { libc::killpg(pgid, libc::SIGKILL) } != 0 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() != Some(libc::ESRCH) {
                tracing::warn!(pgid, error = %err, "Failed to kill Chrome process group");
            }
        }
    }

    #[cfg(not(unix))]
    fn kill_group(&mut self) {
        let _ = self.child.kill();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            self.kill_group();
            if let Err(err) = self.child.kill() {
                tracing::trace!(pid = self.child.id(), error = %err, "Chrome already gone after group kill");
            }
        }
        // Reap to avoid leaving a zombie behind.
        let _ = self.child.wait();
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> Reader {
    thread::spawn(move || {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

/// Joins a reader thread, giving up once `deadline` passes. An abandoned
/// thread finishes on its own when the last writer goes away.
fn collect(handle: Option<Reader>, deadline: Instant, timeout: Duration) -> Result<Vec<u8>> {
    let Some(handle) = handle else {
        return Ok(Vec::new());
    };
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            tracing::warn!(timeout = ?timeout, "Chrome output still open after exit");
            exn::bail!(ErrorKind::ChromeTimeout(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    }
    match handle.join() {
        Ok(bytes) => Ok(bytes.map_err(ErrorKind::from)?),
        Err(_) => exn::bail!(ErrorKind::Io(std::io::Error::other("output reader panicked"))),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::CommandExt;
    use std::path::Path;
    use std::process::{Command, Stdio};

    fn spawn(script: &str) -> Session {
        let child = Command::new("sh")
            .args(["-c", script])
            .process_group(0)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        Session::new(child, TempDir::new().unwrap())
    }

    #[test]
    fn captures_output_of_finished_process() {
        let finished = spawn("printf '<html></html>'; printf 'warn' >&2").wait(Duration::from_secs(5)).unwrap();
        assert!(finished.status.success());
        assert_eq!(finished.stdout, b"<html></html>");
        assert_eq!(finished.stderr, "warn");
    }

    #[test]
    fn reports_exit_code() {
        let finished = spawn("exit 3").wait(Duration::from_secs(5)).unwrap();
        assert_eq!(finished.status.code(), Some(3));
    }

    #[test]
    fn timeout_kills_process_and_removes_profile() {
        let session = spawn("exec sleep 30");
        let profile = session._profile.path().to_path_buf();
        let started = Instant::now();
        let err = session.wait(Duration::from_millis(200)).unwrap_err();
        assert!(matches!(*err, ErrorKind::ChromeTimeout(_)));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(!profile.exists());
    }

    #[test]
    fn background_helper_does_not_hold_output_open() {
        let started = Instant::now();
        let finished = spawn("sleep 5 & echo '<html></html>'").wait(Duration::from_millis(500)).unwrap();
        assert!(started.elapsed() < Duration::from_secs(3), "took {:?}", started.elapsed());
        assert!(finished.status.success());
        assert_eq!(finished.stdout, b"<html></html>\n");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn timeout_kills_whole_process_group() {
        let dir = TempDir::new().unwrap();
        let pid_file = dir.path().join("helper.pid");
        let script = format!("sleep 30 & echo $! > '{}'; wait", pid_file.display());
        let err = spawn(&script).wait(Duration::from_millis(500)).unwrap_err();
        assert!(matches!(*err, ErrorKind::ChromeTimeout(_)));

        let pid = std::fs::read_to_string(&pid_file).unwrap().trim().to_string();
        let stat = Path::new("/proc").join(&pid).join("stat");
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            // Gone entirely, or a zombie waiting for init to reap it.
            let state = std::fs::read_to_string(&stat)
                .ok()
                .and_then(|s| s.rsplit_once(')').and_then(|(_, rest)| rest.split_whitespace().next().map(str::to_owned)));
            match state.as_deref() {
                None | Some("Z") => break,
                Some(other) => assert!(Instant::now() < deadline, "helper {pid} still alive in state {other}"),
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}
