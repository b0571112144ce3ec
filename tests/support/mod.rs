// Shared helpers for integration tests

#![allow(dead_code)]

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use xattrtest::xattr::{LinkXattr, XattrOps};

/// Whether `dir` accepts user-namespace extended attributes
///
/// tmpfs before 6.6 and some overlay setups reject them; tests that need
/// real attributes skip in that case.
pub fn user_xattrs_supported(dir: &Path) -> bool {
    let probe = dir.join(".xattr-probe");
    if std::fs::write(&probe, b"").is_err() {
        return false;
    }
    let path = CString::new(probe.as_os_str().as_bytes()).unwrap();
    let supported = LinkXattr.set(&path, c"user.probe", b"1").is_ok();
    let _ = std::fs::remove_file(&probe);
    if !supported {
        eprintln!("skipping: {} has no user xattr support", dir.display());
    }
    supported
}

/// Write an executable shell script into `dir`
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Names of corpus entries under `dir`, sorted
pub fn corpus_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("file-"))
        .collect();
    names.sort();
    names
}

/// Temporary directory on the build filesystem rather than `/tmp`
pub fn scratch_dir() -> tempfile::TempDir {
    tempfile::TempDir::new_in(env!("CARGO_TARGET_TMPDIR")).unwrap()
}
