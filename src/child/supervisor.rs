//! Child process lifecycle.
//!
//! Launches the emulator with an augmented environment, hands its output pipes
//! to two reader threads, and force-kills it on shutdown.

use super::reader::spawn_line_reader;
use super::signal::send_signal;
use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{unbounded, Receiver};
use std::env;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;

/// Executable search path variable.
pub const PATH_VAR: &str = "PATH";
/// Module search path variable used by the launcher's interpreter.
pub const MODULE_PATH_VAR: &str = "PYTHONPATH";
const SEARCH_PATH_SEPARATOR: &str = ":";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    NotStarted,
    Running,
    Terminated,
}

/// Receivers for the child's output, one per pipe. No ordering holds between them.
pub struct ChildStreams {
    pub stdout: Receiver<Vec<u8>>,
    pub stderr: Receiver<Vec<u8>>,
}

/// Sole owner of the emulator process.
pub struct ChildSupervisor {
    child: Child,
    pid: u32,
    state: ChildState,
    _stdout_thread: thread::JoinHandle<()>,
    _stderr_thread: thread::JoinHandle<()>,
}

/// Copy `vars`, prepending `emubin` to the executable and module search paths.
pub fn augmented_env<I>(vars: I, emubin: &Path) -> Vec<(OsString, OsString)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut out: Vec<(OsString, OsString)> = vars.into_iter().collect();
    for key in [PATH_VAR, MODULE_PATH_VAR] {
        match out.iter_mut().find(|(name, _)| name.as_os_str() == OsStr::new(key)) {
            Some((_, value)) => *value = prepend_search_path(emubin, Some(value.as_os_str())),
            None => out.push((OsString::from(key), prepend_search_path(emubin, None))),
        }
    }
    out
}

fn prepend_search_path(dir: &Path, existing: Option<&OsStr>) -> OsString {
    let mut value = OsString::from(dir);
    if let Some(old) = existing.filter(|old| !old.is_empty()) {
        value.push(SEARCH_PATH_SEPARATOR);
        value.push(old);
    }
    value
}

impl ChildSupervisor {
    /// Spawn `program args... <embed_xid>` and start draining both output pipes.
    pub fn launch(
        program: &str,
        args: &[String],
        emubin: &Path,
        embed_xid: u64,
    ) -> Result<(Self, ChildStreams)> {
        let envs = augmented_env(env::vars_os(), emubin);
        let mut child = Command::new(program)
            .args(args)
            .arg(embed_xid.to_string())
            .env_clear()
            .envs(envs)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to launch {program}"))?;

        let pipes = child.stdout.take().zip(child.stderr.take());
        let Some((stdout, stderr)) = pipes else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(anyhow!("{program} started without captured output pipes"));
        };

        let pid = child.id();
        let (stdout_tx, stdout_rx) = unbounded();
        let (stderr_tx, stderr_rx) = unbounded();
        let stdout_thread = spawn_line_reader("stdout", stdout, stdout_tx);
        let stderr_thread = spawn_line_reader("stderr", stderr, stderr_tx);
        tracing::info!(pid, program, embed_xid, "child launched");

        let supervisor = Self {
            child,
            pid,
            state: ChildState::Running,
            _stdout_thread: stdout_thread,
            _stderr_thread: stderr_thread,
        };
        let streams = ChildStreams {
            stdout: stdout_rx,
            stderr: stderr_rx,
        };
        Ok((supervisor, streams))
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn state(&self) -> ChildState {
        self.state
    }

    /// Fire-and-forget signal delivery to the child.
    pub fn signal(&self, signo: i32) -> bool {
        if self.state != ChildState::Running {
            tracing::debug!(pid = self.pid, signo, "child not running; signal dropped");
            return false;
        }
        send_signal(self.pid, signo)
    }

    /// Send SIGKILL to the recorded pid. The child is reaped if it is already
    /// gone, but the call never blocks waiting for it.
    pub fn kill(&mut self) -> bool {
        if self.state != ChildState::Running {
            return false;
        }
        let sent = send_signal(self.pid, libc::SIGKILL);
        self.state = ChildState::Terminated;
        if let Ok(Some(status)) = self.child.try_wait() {
            tracing::debug!(pid = self.pid, %status, "child reaped");
        }
        sent
    }

    /// Non-blocking exit check; reaps the child when it has exited.
    pub fn try_wait(&mut self) -> Option<ExitStatus> {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                self.state = ChildState::Terminated;
                Some(status)
            }
            Ok(None) => None,
            Err(err) => {
                tracing::debug!(pid = self.pid, "try_wait failed: {err}");
                None
            }
        }
    }

    /// Block until the child exits.
    pub fn wait(&mut self) -> io::Result<ExitStatus> {
        let status = self.child.wait()?;
        self.state = ChildState::Terminated;
        Ok(status)
    }
}

impl Drop for ChildSupervisor {
    fn drop(&mut self) {
        if self.state == ChildState::Running && self.try_wait().is_none() {
            self.kill();
        }
    }
}
