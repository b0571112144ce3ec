//! End-to-end runs of the xattrtest binary
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

mod support;

use predicates::prelude::*;
use support::{corpus_entries, scratch_dir, user_xattrs_supported, write_script};

#[test]
fn test_cli_help() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("xattrtest");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("--xattrs"));
}

#[test]
fn test_zero_files_rejected() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("xattrtest");
    cmd.args(["-f", "0"])
        .assert()
        .failure()
        .code(libc::EINVAL)
        .stderr(predicate::str::contains("files must be >= 1"));
}

#[test]
fn test_random_size_below_header_rejected() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("xattrtest");
    cmd.args(["-r", "-s", "8"])
        .assert()
        .failure()
        .code(libc::EINVAL)
        .stderr(predicate::str::contains(">= 16"));
}

#[test]
fn test_missing_root_fails_with_errno() {
    let dir = scratch_dir();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("xattrtest");
    cmd.arg("-p")
        .arg(dir.path().join("missing"))
        .args(["-f", "2"])
        .assert()
        .failure()
        .code(libc::ENOENT)
        .stderr(predicate::str::contains("open("))
        .stderr(predicate::str::contains("file-1"))
        .stdout(predicate::str::contains("create:").not());
}

#[test]
fn test_failing_hook_aborts_after_create() {
    let dir = scratch_dir();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("xattrtest");
    cmd.arg("-p")
        .arg(dir.path())
        .args(["-f", "3", "-t", "/bin/false"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("create:"))
        .stdout(predicate::str::contains("setxattr:").not())
        .stderr(predicate::str::contains("exited with status 1"));

    // No teardown on failure
    assert_eq!(corpus_entries(dir.path()), vec!["file-1", "file-2", "file-3"]);
}

#[test]
fn test_hook_exit_code_becomes_process_exit_code() {
    let dir = scratch_dir();
    let hook = write_script(dir.path(), "hook.sh", "exit 7");
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("xattrtest");
    cmd.arg("-p")
        .arg(dir.path())
        .arg("-t")
        .arg(&hook)
        .args(["-f", "1"])
        .assert()
        .failure()
        .code(7);
}

#[test]
fn test_bare_hook_name_runs_from_working_directory() {
    let dir = scratch_dir();
    write_script(dir.path(), "hook.sh", "exit 5");
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("xattrtest");
    cmd.current_dir(dir.path())
        .arg("-p")
        .arg(dir.path())
        .args(["-f", "1", "-t", "hook.sh"])
        .assert()
        .failure()
        .code(5)
        .stdout(predicate::str::contains("create:"))
        .stderr(predicate::str::contains("failed to spawn").not());
}

#[test]
fn test_fixed_scenario_three_files() {
    let dir = scratch_dir();
    if !user_xattrs_supported(dir.path()) {
        return;
    }
    let log = dir.path().join("hook.log");
    let hook = write_script(
        dir.path(),
        "hook.sh",
        &format!("echo \"$1\" >> {}", log.display()),
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("xattrtest");
    cmd.arg("-p")
        .arg(dir.path())
        .arg("-t")
        .arg(&hook)
        .args(["-f", "3", "-x", "2", "-s", "20", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"create:   \d+\.\d{6} seconds").unwrap())
        .stdout(predicate::str::is_match(r"setxattr: \d+\.\d{6} seconds").unwrap())
        .stdout(predicate::str::is_match(r"getxattr: \d+\.\d{6} seconds").unwrap())
        .stdout(predicate::str::is_match(r"unlink:   \d+\.\d{6} seconds").unwrap());

    assert!(corpus_entries(dir.path()).is_empty());
    let calls = std::fs::read_to_string(&log).unwrap();
    assert_eq!(calls, "post\npost\npost\npost\n");
}

#[test]
fn test_keep_leaves_attributes_on_disk() {
    let dir = scratch_dir();
    if !user_xattrs_supported(dir.path()) {
        return;
    }

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("xattrtest");
    cmd.arg("-p")
        .arg(dir.path())
        .args(["-f", "2", "-x", "3", "-s", "64", "-r", "-e", "42", "-y", "-k"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unlink:").not());

    assert_eq!(corpus_entries(dir.path()), vec!["file-1", "file-2"]);

    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;
    use xattrtest::payload::decode_header;
    use xattrtest::xattr::{LinkXattr, XattrOps};

    let path = CString::new(dir.path().join("file-2").as_os_str().as_bytes()).unwrap();
    let mut buf = vec![0u8; 128];
    let len = LinkXattr.get(&path, c"user.3", &mut buf).unwrap();
    let (declared, _) = decode_header(&buf[..len]).unwrap();
    assert_eq!(declared, len);
    assert!((16..=64).contains(&len));
}

#[test]
fn test_nth_prints_progress() {
    let dir = scratch_dir();
    if !user_xattrs_supported(dir.path()) {
        return;
    }

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("xattrtest");
    cmd.arg("-p")
        .arg(dir.path())
        .args(["-f", "4", "-n", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "create: {}/file-2",
            dir.path().display()
        )))
        .stdout(predicate::str::contains(format!(
            "getxattr: {}/file-4",
            dir.path().display()
        )))
        .stdout(predicate::str::contains("file-1").not());
}

#[test]
fn test_json_report() {
    let dir = scratch_dir();
    if !user_xattrs_supported(dir.path()) {
        return;
    }

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("xattrtest");
    let output = cmd
        .arg("-p")
        .arg(dir.path())
        .args(["-f", "2", "-x", "2", "-s", "32", "-r", "-e", "9", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["format"], "xattrtest-json-v1");
    assert_eq!(value["config"]["seed"], 9);
    let phases = value["phases"].as_array().unwrap();
    let labels: Vec<&str> = phases.iter().map(|p| p["phase"].as_str().unwrap()).collect();
    assert_eq!(labels, vec!["create", "setxattr", "getxattr", "unlink"]);
    for phase in phases {
        assert!(phase["usecs"].as_i64().unwrap() < 1_000_000);
    }
}

#[test]
fn test_verbose_prints_configuration() {
    let dir = scratch_dir();
    if !user_xattrs_supported(dir.path()) {
        return;
    }

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("xattrtest");
    cmd.arg("-p")
        .arg(dir.path())
        .args(["-v", "-f", "1", "-e", "1234"])
        .assert()
        .success()
        .stdout(predicate::str::contains("files:       1"))
        .stdout(predicate::str::contains("seed:        1234"));
}
