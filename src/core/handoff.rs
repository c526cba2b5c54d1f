//! # Handoff to the main workload.
//!
//! [`handoff`] replaces the supervisor's process image with the workload:
//! same PID, same open descriptors (stdin/stdout/stderr included), and from
//! then on the workload is the direct recipient of every signal. Inside a
//! container that makes the workload PID 1.
//!
//! The argv is taken verbatim from the supervisor's own argv tail and never
//! parsed; only environment entries may be added.
//!
//! On targets without `exec`, the workload is spawned as a child, waited on,
//! and its exit code becomes the supervisor's.

use std::convert::Infallible;
use std::ffi::{OsStr, OsString};
use std::process::Command;

use crate::error::HandoffError;

/// Argument vector (and extra environment) of the main workload.
///
/// Consumed by [`handoff`], so a command can be handed off at most once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandoffCommand {
    argv: Vec<OsString>,
    env: Vec<(OsString, OsString)>,
}

impl HandoffCommand {
    /// Builds a command from an argv; the first element is the program.
    ///
    /// # Example
    /// ```
    /// use execvisor::HandoffCommand;
    ///
    /// let cmd = HandoffCommand::new(["app", "--flag"]).unwrap();
    /// assert_eq!(cmd.program(), "app");
    /// assert_eq!(cmd.to_string(), "app --flag");
    ///
    /// assert!(HandoffCommand::new(Vec::<String>::new()).is_err());
    /// ```
    pub fn new<I, S>(argv: I) -> Result<Self, HandoffError>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
        if argv.is_empty() {
            return Err(HandoffError::EmptyCommand);
        }
        Ok(Self {
            argv,
            env: Vec::new(),
        })
    }

    /// Returns a new command that also sets the given environment entries.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Program to execute.
    pub fn program(&self) -> &OsStr {
        &self.argv[0]
    }

    /// Arguments after the program.
    pub fn args(&self) -> &[OsString] {
        &self.argv[1..]
    }

    /// Full argv, program included.
    pub fn argv(&self) -> &[OsString] {
        &self.argv
    }

    /// Extra environment entries.
    pub fn env(&self) -> &[(OsString, OsString)] {
        &self.env
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(self.program());
        cmd.args(self.args());
        cmd.envs(self.env.iter().map(|(k, v)| (k, v)));
        cmd
    }
}

impl std::fmt::Display for HandoffCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, arg) in self.argv.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Replaces the current process image with `command`.
///
/// Never returns on success. On failure the error names the program and the
/// OS condition; the caller must exit non-zero.
#[cfg(unix)]
pub fn handoff(command: HandoffCommand) -> Result<Infallible, HandoffError> {
    use std::os::unix::process::CommandExt;

    let source = command.to_command().exec();
    Err(HandoffError::ExecFailed {
        program: command.program().to_string_lossy().into_owned(),
        source,
    })
}

/// Runs `command` as a child and exits with its exit code.
///
/// Console Ctrl-C events reach the child directly, since it shares the
/// supervisor's console.
#[cfg(not(unix))]
pub fn handoff(command: HandoffCommand) -> Result<Infallible, HandoffError> {
    match command.to_command().status() {
        Ok(status) => std::process::exit(status.code().unwrap_or(1)),
        Err(source) => Err(HandoffError::ExecFailed {
            program: command.program().to_string_lossy().into_owned(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argv_is_kept_verbatim() {
        let cmd = HandoffCommand::new(["app", "--flag", "", "a b", "-"]).unwrap();
        assert_eq!(cmd.program(), "app");
        assert_eq!(cmd.args(), ["--flag", "", "a b", "-"]);
        assert_eq!(cmd.argv().len(), 5);
    }

    #[test]
    fn test_env_entries_are_appended() {
        let cmd = HandoffCommand::new(["app"])
            .unwrap()
            .with_env([("REDIS_DB", "0")])
            .with_env([("PORT".to_string(), "8000".to_string())]);
        assert_eq!(cmd.env().len(), 2);
        assert_eq!(cmd.env()[0].0, "REDIS_DB");
    }

    #[test]
    fn test_empty_argv_is_rejected() {
        let err = HandoffCommand::new(Vec::<OsString>::new()).unwrap_err();
        assert!(matches!(err, HandoffError::EmptyCommand));
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_program_is_exec_failed() {
        let cmd = HandoffCommand::new(["/nonexistent/app"]).unwrap();
        let Err(err) = handoff(cmd);
        match err {
            HandoffError::ExecFailed { program, source } => {
                assert_eq!(program, "/nonexistent/app");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
