//! Scoped buffer acquisition
//!
//! Each phase acquires its buffers once up front and reuses them for every
//! loop iteration. Acquisition is fallible so an allocation failure becomes
//! [`BenchError::Allocation`] instead of an abort; release is plain `Drop`.

use std::ffi::{CStr, OsStr};
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use crate::error::{BenchError, Result};

/// Capacity reserved for corpus entry paths
pub const PATH_CAPACITY: usize = libc::PATH_MAX as usize;

/// Capacity reserved for attribute names
pub const NAME_CAPACITY: usize = 32;

/// Acquire a byte buffer of `len` bytes, every byte set to `fill`
pub fn acquire(what: &'static str, len: usize, fill: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| BenchError::Allocation { what, bytes: len })?;
    buf.resize(len, fill);
    Ok(buf)
}

/// Reusable NUL-terminated name, usable both as a `Path` and a `CStr`
///
/// The contents never include an interior NUL: callers only append
/// validated path bytes and ASCII digits.
#[derive(Debug)]
pub struct CName {
    bytes: Vec<u8>,
}

impl CName {
    /// Acquire a name buffer able to hold `capacity` bytes without growing
    pub fn acquire(what: &'static str, capacity: usize) -> Result<Self> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(capacity + 1)
            .map_err(|_| BenchError::Allocation {
                what,
                bytes: capacity + 1,
            })?;
        bytes.push(0);
        Ok(Self { bytes })
    }

    /// Replace the contents with `prefix` followed by `index` in decimal
    pub fn set_indexed(&mut self, prefix: &[u8], index: usize) {
        self.bytes.clear();
        self.bytes.extend_from_slice(prefix);
        // Writing into a Vec cannot fail
        let _ = write!(self.bytes, "{}", index);
        self.bytes.push(0);
    }

    /// Replace the contents with `root`, `/`, `stem` and `index`
    pub fn set_joined(&mut self, root: &Path, stem: &[u8], index: usize) {
        self.bytes.clear();
        self.bytes.extend_from_slice(root.as_os_str().as_bytes());
        self.bytes.push(b'/');
        self.bytes.extend_from_slice(stem);
        let _ = write!(self.bytes, "{}", index);
        self.bytes.push(0);
    }

    /// Bytes without the terminator
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.bytes.len() - 1]
    }

    pub fn as_cstr(&self) -> &CStr {
        CStr::from_bytes_until_nul(&self.bytes).unwrap_or_default()
    }

    pub fn as_path(&self) -> &Path {
        Path::new(OsStr::from_bytes(self.as_bytes()))
    }

    /// Lossy text form for diagnostics
    pub fn display(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }
}
