//! Cache control between phases
//!
//! Runs only after a phase's timer has stopped: optional `sync(2)`, optional
//! kernel cache drop, then the configured hook executable with the phase
//! token as its sole argument. The hook always runs; the default target is
//! a no-op executable. The hook is a path, never looked up on `PATH`.

use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::RunConfig;
use crate::error::{HookError, Result};

/// Kernel interface for dropping page cache, dentries and inodes
pub const DROP_CACHES_PATH: &str = "/proc/sys/vm/drop_caches";

/// "Drop page cache, dentries and inodes"
const DROP_ALL: &[u8] = b"3";

/// How a hook process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStatus {
    Exited(i32),
    Signaled(i32),
}

/// Run an executable with arguments and report how it ended
pub trait HookRunner {
    fn run(&self, program: &Path, args: &[&str]) -> std::io::Result<HookStatus>;
}

impl<T: HookRunner + ?Sized> HookRunner for &T {
    fn run(&self, program: &Path, args: &[&str]) -> std::io::Result<HookStatus> {
        (**self).run(program, args)
    }
}

/// Spawns the hook as a child process with stdio discarded
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl HookRunner for ProcessRunner {
    fn run(&self, program: &Path, args: &[&str]) -> std::io::Result<HookStatus> {
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        Ok(match status.code() {
            Some(code) => HookStatus::Exited(code),
            None => HookStatus::Signaled(status.signal().unwrap_or(0)),
        })
    }
}

/// Path handed to the runner for a configured hook
///
/// A bare file name refers to the working directory.
pub fn hook_command(hook: &Path) -> PathBuf {
    if hook.is_relative() && hook.parent() == Some(Path::new("")) {
        Path::new(".").join(hook)
    } else {
        hook.to_path_buf()
    }
}

/// Post-phase sync / drop / hook sequence
#[derive(Debug)]
pub struct CacheControl<R: HookRunner = ProcessRunner> {
    sync: bool,
    drop_caches: bool,
    drop_path: PathBuf,
    hook: PathBuf,
    runner: R,
}

impl CacheControl<ProcessRunner> {
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config, ProcessRunner)
    }
}

impl<R: HookRunner> CacheControl<R> {
    pub fn new(config: &RunConfig, runner: R) -> Self {
        Self {
            sync: config.sync,
            drop_caches: config.drop_caches,
            drop_path: PathBuf::from(DROP_CACHES_PATH),
            hook: hook_command(&config.hook),
            runner,
        }
    }

    /// Use a different cache-drop control file
    pub fn with_drop_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.drop_path = path.into();
        self
    }

    /// Perturb caches and run the hook for `token`
    pub fn after_phase(&self, token: &str) -> Result<()> {
        if self.sync {
            nix::unistd::sync();
            tracing::debug!("synced");
        }

        if self.drop_caches {
            drop_caches(&self.drop_path)?;
            tracing::debug!(path = %self.drop_path.display(), "dropped caches");
        }

        self.run_hook(token)?;
        Ok(())
    }

    fn run_hook(&self, token: &str) -> std::result::Result<(), HookError> {
        let status = self
            .runner
            .run(&self.hook, &[token])
            .map_err(|source| HookError::Spawn {
                program: self.hook.clone(),
                source,
            })?;

        match status {
            HookStatus::Exited(0) => {
                tracing::debug!(hook = %self.hook.display(), token, "hook finished");
                Ok(())
            }
            HookStatus::Exited(code) => Err(HookError::Exit {
                program: self.hook.clone(),
                code,
            }),
            HookStatus::Signaled(signal) => Err(HookError::Signal {
                program: self.hook.clone(),
                signal,
            }),
        }
    }
}

/// Write the drop request; refusal is fatal
fn drop_caches(path: &Path) -> std::result::Result<(), HookError> {
    let fail = |source| HookError::DropCaches {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new().write(true).open(path).map_err(fail)?;
    file.write_all(DROP_ALL).map_err(fail)?;
    Ok(())
}
