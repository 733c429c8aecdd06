use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// md5("abc")
const ABC_DIGEST: &str = "900150983cd24fb0d6963f7d28e17f72";
// md5("zzzz"), not reachable from the alphabets used below
const ZZZZ_DIGEST: &str = "02c425157ecd32f259548b33402ff6d3";

fn coordinator() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_coordinator"))
}

fn worker() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_search-worker"))
}

fn run_coordinator(dir: &Path, args: &[&str], worker_bin: &Path) -> Output {
    Command::new(coordinator())
        .args(args)
        .arg("--result-file")
        .arg(dir.join("found.txt"))
        .arg("--worker-bin")
        .arg(worker_bin)
        .current_dir(dir)
        .output()
        .expect("Failed to execute coordinator")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_finds_preimage_with_worker_processes() {
    let dir = TempDir::new().unwrap();
    let output = run_coordinator(dir.path(), &[ABC_DIGEST, "3", "abc", "4"], &worker());

    assert!(
        output.status.success(),
        "Command failed with status: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Search space: 27 candidates"));
    assert!(stdout.contains("Worker 0 found the candidate: abc"));
    assert!(stdout.contains(&format!("Digest verified: {}", ABC_DIGEST)));
    assert_eq!(
        fs::read_to_string(dir.path().join("found.txt")).unwrap(),
        "0:abc\n"
    );
}

#[test]
fn test_reports_range_boundaries_as_candidates() {
    let dir = TempDir::new().unwrap();
    let output = run_coordinator(dir.path(), &[ZZZZ_DIGEST, "2", "ab", "3"], &worker());

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("worker 0 | pid"));
    assert!(stdout.contains("| aa .. ab (2 candidates)"));
    assert!(stdout.contains("| ba .. ba (1 candidates)"));
    assert!(stdout.contains("| bb .. bb (1 candidates)"));
    assert!(stdout.contains("No candidate in the search space matches the target."));
}

#[test]
fn test_more_workers_than_candidates() {
    let dir = TempDir::new().unwrap();
    let output = run_coordinator(dir.path(), &[ZZZZ_DIGEST, "1", "abc", "5"], &worker());

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert_eq!(stdout.matches("| (empty)").count(), 2);
    assert!(stdout.contains("Workers collected: 5 (5 finished normally)"));
    assert!(stdout.contains("No candidate in the search space matches the target."));
}

#[test]
fn test_in_process_mode() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(coordinator())
        .args([ABC_DIGEST, "3", "cba", "2", "--in-process"])
        .arg("--result-file")
        .arg(dir.path().join("found.txt"))
        .output()
        .expect("Failed to execute coordinator");

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("| task "));
    // With alphabet "cba", "abc" is index 2*9 + 1*3 + 0 = 21, in worker 1's range [14, 27)
    assert!(stdout.contains("Worker 1 found the candidate: abc"));
}

#[test]
fn test_invalid_parameters_exit_nonzero() {
    let dir = TempDir::new().unwrap();
    let cases: [(&[&str], &str); 5] = [
        (&[ABC_DIGEST, "0", "abc", "2"], "candidate length"),
        (&[ABC_DIGEST, "3", "abc", "17"], "worker count"),
        (&[ABC_DIGEST, "3", "aba", "2"], "more than once"),
        (&[ABC_DIGEST, "2", "a\n", "2"], "line break"),
        (&["not-a-digest", "3", "abc", "2"], "invalid target digest"),
    ];

    for (args, message) in cases {
        let output = run_coordinator(dir.path(), args, &worker());
        assert_eq!(output.status.code(), Some(1), "args {:?}", args);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains(message), "stderr {:?} lacks {:?}", stderr, message);
        assert!(!dir.path().join("found.txt").exists());
    }
}

#[test]
fn test_missing_arguments_is_usage_error() {
    let output = Command::new(coordinator())
        .arg(ABC_DIGEST)
        .output()
        .expect("Failed to execute coordinator");
    assert!(!output.status.success());
}

#[test]
fn test_help_documents_default_worker_count() {
    let output = Command::new(coordinator())
        .arg("--help")
        .output()
        .expect("Failed to execute coordinator");

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("[WORKER_COUNT]"));
    assert!(stdout.contains("defaults to the CPU count (capped at 16)"));
}

#[test]
fn test_worker_count_may_be_omitted() {
    let dir = TempDir::new().unwrap();
    let output = run_coordinator(dir.path(), &[ABC_DIGEST, "3", "abc"], &worker());

    assert!(output.status.success());
    // Which worker owns "abc" depends on the CPU count
    assert!(stdout_of(&output).contains("found the candidate: abc"));
}

#[test]
fn test_missing_worker_binary_is_inconclusive() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("no-such-worker");
    let output = run_coordinator(dir.path(), &[ABC_DIGEST, "3", "abc", "2"], &missing);

    assert_eq!(output.status.code(), Some(1));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("not started"));
    assert!(stdout.contains("Search inconclusive: workers 0, 1 did not complete"));
}

#[test]
fn test_stale_result_does_not_leak_into_run() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("found.txt"), "1:abc\n").unwrap();

    let output = run_coordinator(dir.path(), &[ABC_DIGEST, "2", "ab", "2"], &worker());

    assert!(output.status.success());
    assert!(stdout_of(&output).contains("No candidate in the search space matches the target."));
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_failing_workers_make_run_inconclusive() {
        let dir = TempDir::new().unwrap();
        let failing = script(dir.path(), "failing-worker", "exit 4");

        let output = run_coordinator(dir.path(), &[ABC_DIGEST, "3", "abc", "3"], &failing);

        assert!(output.status.success());
        let stdout = stdout_of(&output);
        assert_eq!(stdout.matches("failed with exit code 4").count(), 3);
        assert!(stdout.contains("Search inconclusive: workers 0, 1, 2 did not complete"));
    }

    #[test]
    fn test_killed_worker_is_abnormal_termination() {
        let dir = TempDir::new().unwrap();
        let killed = script(dir.path(), "killed-worker", "kill -9 $$");

        let output = run_coordinator(dir.path(), &[ABC_DIGEST, "3", "abc", "2"], &killed);

        assert!(output.status.success());
        let stdout = stdout_of(&output);
        assert!(stdout.contains("terminated abnormally (signal 9)"));
        assert!(stdout.contains("Search inconclusive"));
    }

    #[test]
    fn test_unverifiable_claim_is_integrity_error() {
        let dir = TempDir::new().unwrap();
        // Every worker claims "aaa" regardless of the target
        let liar = script(
            dir.path(),
            "lying-worker",
            &format!(
                "[ -e '{0}' ] || echo '0:aaa' > '{0}'",
                dir.path().join("found.txt").display()
            ),
        );

        let output = run_coordinator(dir.path(), &[ABC_DIGEST, "3", "abc", "2"], &liar);

        assert_eq!(output.status.code(), Some(3));
        assert!(stdout_of(&output).contains("INTEGRITY ERROR: worker 0 claimed 'aaa'"));
    }

    #[test]
    fn test_malformed_result_is_a_warning() {
        let dir = TempDir::new().unwrap();
        let garbage = script(
            dir.path(),
            "garbage-worker",
            &format!("echo 'garbage' > '{}'", dir.path().join("found.txt").display()),
        );

        let output = run_coordinator(dir.path(), &[ABC_DIGEST, "3", "abc", "2"], &garbage);

        assert!(output.status.success());
        let stdout = stdout_of(&output);
        assert!(stdout.contains("ignoring unreadable result artifact"));
        assert!(stdout.contains("No candidate in the search space matches the target."));
    }
}
