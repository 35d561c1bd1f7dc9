//! Controller for the ancillary light-effect child process.
//!
//! The effect script drives NeoPixels and needs root: run it directly when
//! we already are root, via non-interactive sudo when that works without a
//! prompt, and otherwise skip it with a warning. Stop is graceful SIGTERM
//! with a kill fallback after a short grace period.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use crate::app::Logger;

const STOP_GRACE: Duration = Duration::from_secs(5);

pub struct LightEffect {
    script: PathBuf,
    child: Option<Child>,
    sudo_ok: Option<bool>,
}

impl LightEffect {
    pub fn new(script: PathBuf) -> Self {
        Self {
            script,
            child: None,
            sudo_ok: None,
        }
    }

    /// Start the effect process. Does nothing when one is already running.
    pub fn start(&mut self, logger: &Logger) {
        if self.is_running() {
            return;
        }
        if !self.script.exists() {
            logger.warn(format!(
                "light effect script not found: {}",
                self.script.display()
            ));
            return;
        }

        let root = is_root();
        let sudo_ok = !root && self.can_use_sudo_n();
        let Some(argv) = launch_argv(&self.script, root, sudo_ok) else {
            logger.warn(
                "cannot start light effect: sudo would prompt for a password; \
                 run as root or configure passwordless sudo for the script",
            );
            return;
        };

        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..]).stdout(Stdio::null()).stderr(Stdio::null());
        match cmd.spawn() {
            Ok(child) => {
                logger.info(format!("started light effect, pid={}", child.id()));
                self.child = Some(child);
            }
            Err(err) => {
                logger.warn(format!("failed to start light effect: {err}"));
                self.child = None;
            }
        }
    }

    /// Stop the running effect process, if any. SIGTERM first; SIGKILL when
    /// the grace period runs out.
    pub fn stop(&mut self, logger: &Logger) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        if !send_sigterm(&child) {
            logger.warn("failed to signal light effect; killing");
        }
        let deadline = Instant::now() + STOP_GRACE;
        loop {
            match child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(100));
                }
                Ok(None) => break,
                Err(err) => {
                    logger.warn(format!("error waiting for light effect: {err}"));
                    break;
                }
            }
        }
        let _ = child.kill();
        let _ = child.wait();
    }

    fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Whether `sudo -n true` succeeds without prompting. Probed once.
    fn can_use_sudo_n(&mut self) -> bool {
        if let Some(cached) = self.sudo_ok {
            return cached;
        }
        let ok = Command::new("sudo")
            .args(["-n", "true"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);
        self.sudo_ok = Some(ok);
        ok
    }
}

impl Drop for LightEffect {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn launch_argv(script: &Path, root: bool, sudo_ok: bool) -> Option<Vec<OsString>> {
    if root {
        Some(vec![script.as_os_str().to_os_string()])
    } else if sudo_ok {
        Some(vec![
            OsString::from("sudo"),
            OsString::from("-n"),
            script.as_os_str().to_os_string(),
        ])
    } else {
        None
    }
}

#[cfg(unix)]
fn is_root() -> bool {
    rustix::process::geteuid().is_root()
}

#[cfg(not(unix))]
fn is_root() -> bool {
    false
}

#[cfg(unix)]
fn send_sigterm(child: &Child) -> bool {
    let pid = rustix::process::Pid::from_child(child);
    rustix::process::kill_process(pid, rustix::process::Signal::TERM).is_ok()
}

#[cfg(not(unix))]
fn send_sigterm(_child: &Child) -> bool {
    false
}
