//! # Launching dependency processes.
//!
//! [`start_dependency`] issues the launch and returns as soon as the process
//! is on its way; it never waits for readiness.
//!
//! ```text
//! Daemonize:   spawn launcher ─► wait (≤ max_wait) ─► status 0 ? Ok : LauncherExited
//!                                      └─ deadline ─► LauncherHung
//! Background:  spawn in own process group ─► drop handle ─► Ok
//! spawn error (ENOENT, EACCES, ...)       ─► LaunchFailed
//! ```
//!
//! Dependencies inherit stdout/stderr so their logs reach the container output.

use std::process::Stdio;

use tokio::process::Command;
use tokio::time;

use crate::dependency::{DependencySpec, LaunchCommand, LaunchMode};
use crate::error::StartError;

/// Launches the dependency described by `spec`.
///
/// A spec without a launch command is externally managed; nothing is started.
/// The launch is attempted unconditionally: whether an already-running
/// dependency is started again is decided by the caller
/// (see [`DependencySpec::skip_if_ready`]).
pub async fn start_dependency(spec: &DependencySpec) -> Result<(), StartError> {
    let Some(launch) = spec.launch() else {
        return Ok(());
    };

    let mut cmd = command(launch);
    let mut child = cmd.spawn().map_err(|source| StartError::LaunchFailed {
        name: spec.name().to_string(),
        program: launch.program().to_string(),
        source,
    })?;

    match launch.mode() {
        LaunchMode::Background => Ok(()),
        LaunchMode::Daemonize => match time::timeout(spec.max_wait(), child.wait()).await {
            Ok(Ok(status)) if status.success() => Ok(()),
            Ok(Ok(status)) => Err(StartError::LauncherExited {
                name: spec.name().to_string(),
                program: launch.program().to_string(),
                status,
            }),
            Ok(Err(source)) => Err(StartError::LaunchFailed {
                name: spec.name().to_string(),
                program: launch.program().to_string(),
                source,
            }),
            Err(_elapsed) => Err(StartError::LauncherHung {
                name: spec.name().to_string(),
                program: launch.program().to_string(),
                waited: spec.max_wait(),
            }),
        },
    }
}

fn command(launch: &LaunchCommand) -> Command {
    let mut std_cmd = std::process::Command::new(launch.program());
    std_cmd
        .args(launch.args())
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    // Keep terminal-generated signals (Ctrl-C) aimed at the supervisor's
    // group away from a foreground dependency.
    #[cfg(unix)]
    if launch.mode() == LaunchMode::Background {
        use std::os::unix::process::CommandExt;
        std_cmd.process_group(0);
    }

    let mut cmd = Command::from(std_cmd);
    cmd.kill_on_drop(false);
    cmd
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::dependency::Probe;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;

    fn spec(launch: LaunchCommand) -> DependencySpec {
        DependencySpec::new("redis", Probe::tcp("127.0.0.1", 1))
            .with_launch(launch)
            .with_max_wait(Duration::from_secs(2))
    }

    fn script(dir: &tempfile::TempDir, body: &str, mode: u32) -> String {
        let path = dir.path().join("launcher.sh");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "#!/bin/sh\n{body}").unwrap();
        drop(file);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_missing_binary_is_launch_failed() {
        let err = start_dependency(&spec(LaunchCommand::daemonize(
            "/nonexistent/redis-server",
            ["--daemonize", "yes"],
        )))
        .await
        .unwrap_err();

        assert_eq!(err.as_label(), "start_launch_failed");
        assert_eq!(err.dependency(), "redis");
        assert!(err.to_string().contains("redis"));
    }

    #[tokio::test]
    async fn test_permission_denied_is_launch_failed() {
        let dir = tempfile::tempdir().unwrap();
        let path = script(&dir, "exit 0", 0o644);
        let err = start_dependency(&spec(LaunchCommand::daemonize(path, Vec::<String>::new())))
            .await
            .unwrap_err();
        assert!(matches!(err, StartError::LaunchFailed { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_daemonize_checks_launcher_status() {
        let dir = tempfile::tempdir().unwrap();
        let ok = script(&dir, "exit 0", 0o755);
        start_dependency(&spec(LaunchCommand::daemonize(ok, Vec::<String>::new())))
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let bad = script(&dir, "exit 3", 0o755);
        let err = start_dependency(&spec(LaunchCommand::daemonize(bad, Vec::<String>::new())))
            .await
            .unwrap_err();
        assert!(matches!(err, StartError::LauncherExited { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_daemonize_launcher_that_never_exits_is_hung() {
        let dir = tempfile::tempdir().unwrap();
        let path = script(&dir, "exec sleep 5", 0o755);
        let spec = spec(LaunchCommand::daemonize(path, Vec::<String>::new()))
            .with_max_wait(Duration::from_millis(200));
        let err = start_dependency(&spec).await.unwrap_err();
        assert_eq!(err.as_label(), "start_launcher_hung");
    }

    #[tokio::test]
    async fn test_background_returns_without_waiting() {
        let started = std::time::Instant::now();
        start_dependency(&spec(LaunchCommand::background("sleep", ["2"])))
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_wait_only_spec_launches_nothing() {
        let spec = DependencySpec::new("external", Probe::tcp("127.0.0.1", 1));
        start_dependency(&spec).await.unwrap();
    }
}
