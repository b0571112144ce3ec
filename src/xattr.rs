//! Extended attribute access
//!
//! [`XattrOps`] is the seam between the phases and the kernel. The real
//! implementation calls `lsetxattr(2)` / `lgetxattr(2)` directly so that
//! the path and name buffers owned by each phase are passed through without
//! per-call allocation.

use nix::errno::Errno;
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::CStr;

/// Prefix of every attribute name (user namespace)
pub const NAME_PREFIX: &[u8] = b"user.";

/// Set/get of a single named attribute on a path
pub trait XattrOps {
    /// Set `name` to `value`, replacing any existing value
    fn set(&self, path: &CStr, name: &CStr, value: &[u8]) -> Result<(), Errno>;

    /// Read `name` into `buf`, returning the value length
    fn get(&self, path: &CStr, name: &CStr, buf: &mut [u8]) -> Result<usize, Errno>;
}

impl<T: XattrOps + ?Sized> XattrOps for &T {
    fn set(&self, path: &CStr, name: &CStr, value: &[u8]) -> Result<(), Errno> {
        (**self).set(path, name, value)
    }

    fn get(&self, path: &CStr, name: &CStr, buf: &mut [u8]) -> Result<usize, Errno> {
        (**self).get(path, name, buf)
    }
}

/// Kernel attributes, not following symlinks
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkXattr;

impl XattrOps for LinkXattr {
    fn set(&self, path: &CStr, name: &CStr, value: &[u8]) -> Result<(), Errno> {
        // SAFETY: both strings are NUL-terminated and `value` is valid for
        // `value.len()` bytes for the duration of the call.
        let rc = unsafe {
            libc::lsetxattr(
                path.as_ptr(),
                name.as_ptr(),
                value.as_ptr().cast(),
                value.len(),
                0,
            )
        };
        Errno::result(rc).map(drop)
    }

    fn get(&self, path: &CStr, name: &CStr, buf: &mut [u8]) -> Result<usize, Errno> {
        // SAFETY: `buf` is writable for `buf.len()` bytes and the kernel
        // writes at most that many.
        let rc = unsafe {
            libc::lgetxattr(
                path.as_ptr(),
                name.as_ptr(),
                buf.as_mut_ptr().cast(),
                buf.len(),
            )
        };
        Errno::result(rc).map(|len| len as usize)
    }
}

/// In-memory attribute store with kernel-like `ERANGE`/`ENODATA` behavior
#[derive(Debug, Default)]
pub struct MemoryXattr {
    values: RefCell<HashMap<(Vec<u8>, Vec<u8>), Vec<u8>>>,
}

impl MemoryXattr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored (path, name) slots
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }

    /// Stored value for a slot, if any
    pub fn value(&self, path: &[u8], name: &[u8]) -> Option<Vec<u8>> {
        self.values
            .borrow()
            .get(&(path.to_vec(), name.to_vec()))
            .cloned()
    }

    /// Overwrite a slot directly, bypassing the set path
    pub fn insert(&self, path: &[u8], name: &[u8], value: Vec<u8>) {
        self.values
            .borrow_mut()
            .insert((path.to_vec(), name.to_vec()), value);
    }
}

impl XattrOps for MemoryXattr {
    fn set(&self, path: &CStr, name: &CStr, value: &[u8]) -> Result<(), Errno> {
        self.insert(path.to_bytes(), name.to_bytes(), value.to_vec());
        Ok(())
    }

    fn get(&self, path: &CStr, name: &CStr, buf: &mut [u8]) -> Result<usize, Errno> {
        let values = self.values.borrow();
        let value = values
            .get(&(path.to_bytes().to_vec(), name.to_bytes().to_vec()))
            .ok_or(Errno::ENODATA)?;
        if value.len() > buf.len() {
            return Err(Errno::ERANGE);
        }
        buf[..value.len()].copy_from_slice(value);
        Ok(value.len())
    }
}
