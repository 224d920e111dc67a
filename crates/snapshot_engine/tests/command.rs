#![cfg(unix)]

use std::time::Duration;

use snapshot_engine::{run_command, CommandError};

#[test]
fn captures_stdout_stderr_and_status() {
    let output = run_command(
        "sh",
        &["-c", "echo out; echo err >&2; exit 3"],
        Duration::from_secs(10),
    )
    .unwrap();
    assert!(!output.success());
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(output.stdout, "out\n");
    assert_eq!(output.stderr, "err\n");
}

#[test]
fn large_output_does_not_stall() {
    let output = run_command(
        "sh",
        &["-c", "i=0; while [ $i -lt 20000 ]; do echo 0123456789; i=$((i+1)); done"],
        Duration::from_secs(30),
    )
    .unwrap();
    assert!(output.success());
    assert_eq!(output.stdout.len(), 20000 * 11);
}

#[test]
fn slow_command_times_out() {
    let err = run_command("sh", &["-c", "sleep 5"], Duration::from_millis(100)).unwrap_err();
    assert!(matches!(err, CommandError::TimedOut { .. }));
}

#[test]
fn missing_program_is_spawn_error() {
    let err = run_command("definitely-not-a-real-binary-xyz", &[], Duration::from_secs(1))
        .unwrap_err();
    assert!(matches!(err, CommandError::Spawn { .. }));
}
