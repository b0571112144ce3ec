//! Error taxonomy for a benchmark run
//!
//! Every variant is fatal at the run level. The only tolerated condition,
//! "entry already absent" during removal, never reaches this type.

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the cache-control step between phases
#[derive(Error, Debug)]
pub enum HookError {
    #[error("failed to drop caches via {}: {source}", .path.display())]
    DropCaches {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn hook {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("hook {} exited with status {code}", .program.display())]
    Exit { program: PathBuf, code: i32 },

    #[error("hook {} killed by signal {signal}", .program.display())]
    Signal { program: PathBuf, signal: i32 },
}

/// Errors that abort a benchmark run
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to allocate {bytes} bytes for {what}")]
    Allocation { what: &'static str, bytes: usize },

    #[error("{op}({}{}) failed: {source}", .path.display(), .name.as_deref().map(|n| format!(", {n}")).unwrap_or_default())]
    Io {
        op: &'static str,
        path: PathBuf,
        name: Option<String>,
        #[source]
        source: std::io::Error,
    },

    #[error("verify failed for {} {name}: {detail}\nverify: {expected}\nvalue:  {actual}", .path.display())]
    Verify {
        path: PathBuf,
        name: String,
        detail: String,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Hook(#[from] HookError),
}

/// Result type for benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;

impl BenchError {
    /// Build an I/O error for a path-level operation
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BenchError::Io {
            op,
            path: path.into(),
            name: None,
            source,
        }
    }

    /// Build an I/O error for an attribute-level operation
    pub fn attr_io(
        op: &'static str,
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        BenchError::Io {
            op,
            path: path.into(),
            name: Some(name.into()),
            source,
        }
    }

    /// Process exit status for this failure (never zero)
    pub fn exit_code(&self) -> i32 {
        let code = match self {
            BenchError::Config(_) | BenchError::Verify { .. } => libc::EINVAL,
            BenchError::Allocation { .. } => libc::ENOMEM,
            BenchError::Io { source, .. } => source.raw_os_error().unwrap_or(libc::EIO),
            BenchError::Hook(HookError::DropCaches { source, .. })
            | BenchError::Hook(HookError::Spawn { source, .. }) => {
                source.raw_os_error().unwrap_or(libc::EIO)
            }
            BenchError::Hook(HookError::Exit { code, .. }) => *code,
            BenchError::Hook(HookError::Signal { signal, .. }) => 128 + signal,
        };
        if code == 0 {
            1
        } else {
            code
        }
    }
}
