//! End-to-end runs of the `execvisor` binary.
#![cfg(unix)]

use std::net::{TcpListener, TcpStream};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use execvisor::{EXIT_EXEC_NOT_FOUND, EXIT_NOT_READY, EXIT_START_FAILED, EXIT_USAGE};

const BIN: &str = env!("CARGO_BIN_EXE_execvisor");

/// A command with a clean environment, so outer `REDIS_*` settings never leak in.
fn execvisor(env: &[(&str, String)]) -> Command {
    let mut cmd = Command::new(BIN);
    cmd.env_clear()
        .env("PATH", std::env::var("PATH").unwrap_or_default())
        .env("RUST_LOG", "debug")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (k, v) in env {
        cmd.env(k, v);
    }
    cmd
}

fn listening() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

fn closed_port() -> u16 {
    listening().1
}

fn wait_only(port: u16) -> Vec<(&'static str, String)> {
    vec![
        ("REDIS_AUTOSTART", "false".to_string()),
        ("REDIS_HOST", "127.0.0.1".to_string()),
        ("REDIS_PORT", port.to_string()),
    ]
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn test_handoff_keeps_pid_and_argv() {
    let (_listener, port) = listening();
    let child = execvisor(&wait_only(port))
        .args([
            "/bin/sh",
            "-c",
            r#"echo "$$"; printf '%s\n' "$0" "$@"; echo "db=$REDIS_DB port=$PORT""#,
            "app",
            "--flag",
            "two words",
        ])
        .spawn()
        .unwrap();
    let pid = child.id();
    let out = child.wait_with_output().unwrap();

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let stdout = stdout(&out);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], pid.to_string(), "workload must inherit the supervisor PID");
    assert_eq!(lines[1..4], ["app", "--flag", "two words"]);
    assert_eq!(lines[4], "db=0 port=8000");
}

#[test]
fn test_workload_exit_code_is_passed_through() {
    let (_listener, port) = listening();
    let out = execvisor(&wait_only(port))
        .args(["/bin/sh", "-c", "exit 42"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(42));
}

#[test]
fn test_missing_dependency_binary_fails_before_handoff() {
    let port = closed_port();
    let out = execvisor(&[
        ("REDIS_SERVER", "/nonexistent/redis-server".to_string()),
        ("REDIS_HOST", "127.0.0.1".to_string()),
        ("REDIS_PORT", port.to_string()),
    ])
    .args(["/bin/sh", "-c", "echo handed-off"])
    .output()
    .unwrap();

    assert_eq!(out.status.code(), Some(i32::from(EXIT_START_FAILED)));
    assert!(stderr(&out).contains("redis"), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("start_launch_failed"));
    assert!(!stdout(&out).contains("handed-off"));
}

#[test]
fn test_readiness_timeout_respects_deadline() {
    let port = closed_port();
    let mut env = wait_only(port);
    env.push(("REDIS_STARTUP_TIMEOUT_MS", "1000".to_string()));
    env.push(("REDIS_POLL_INTERVAL_MS", "200".to_string()));

    let started = Instant::now();
    let out = execvisor(&env)
        .args(["/bin/sh", "-c", "echo handed-off"])
        .output()
        .unwrap();
    let took = started.elapsed();

    assert_eq!(out.status.code(), Some(i32::from(EXIT_NOT_READY)));
    assert!(took >= Duration::from_secs(1), "gave up after {took:?}");
    assert!(took < Duration::from_secs(3), "took {took:?}");
    assert!(stderr(&out).contains("readiness_timeout"), "stderr: {}", stderr(&out));
    assert!(!stdout(&out).contains("handed-off"));
}

#[test]
fn test_missing_workload_is_distinct_from_dependency_failure() {
    let (_listener, port) = listening();
    let out = execvisor(&wait_only(port))
        .arg("/nonexistent/app")
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(i32::from(EXIT_EXEC_NOT_FOUND)));
    assert!(stderr(&out).contains("/nonexistent/app"));
    assert!(stderr(&out).contains("handoff_exec_failed"));
}

#[test]
fn test_no_workload_is_usage_error() {
    let out = execvisor(&[]).output().unwrap();
    assert_eq!(out.status.code(), Some(i32::from(EXIT_USAGE)));
}

#[test]
fn test_invalid_config_is_usage_error() {
    let out = execvisor(&[("REDIS_PORT", "six".to_string())])
        .args(["/bin/sh", "-c", "echo handed-off"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(i32::from(EXIT_USAGE)));
    assert!(stderr(&out).contains("REDIS_PORT"));
}

#[test]
fn test_repeated_runs_against_ready_dependency_behave_identically() {
    let (_listener, port) = listening();
    let env = vec![
        ("REDIS_SERVER", "/nonexistent/redis-server".to_string()),
        ("REDIS_HOST", "127.0.0.1".to_string()),
        ("REDIS_PORT", port.to_string()),
    ];
    for _ in 0..2 {
        let out = execvisor(&env)
            .args(["/bin/sh", "-c", "echo handed-off"])
            .output()
            .unwrap();
        assert!(out.status.success(), "stderr: {}", stderr(&out));
        assert_eq!(stdout(&out).trim(), "handed-off");
        assert!(stderr(&out).contains("launch skipped"));
    }
}

/// Needs a real `redis-server` on PATH; skipped otherwise.
#[test]
fn test_starts_real_redis_then_hands_off() {
    let available = Command::new("redis-server")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    if !available {
        eprintln!("redis-server not found; skipping");
        return;
    }

    let port = closed_port();
    let out = execvisor(&[
        ("REDIS_HOST", "127.0.0.1".to_string()),
        ("REDIS_PORT", port.to_string()),
        ("REDIS_PROBE", "ping".to_string()),
    ])
    .args(["/bin/sh", "-c", "echo handed-off"])
    .output()
    .unwrap();

    // Stop the daemonized server regardless of the outcome.
    if let Ok(mut stream) = TcpStream::connect(("127.0.0.1", port)) {
        use std::io::Write;
        let _ = stream.write_all(b"SHUTDOWN NOSAVE\r\n");
    }

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "handed-off");
    assert!(stderr(&out).contains("dependency ready"));
}
