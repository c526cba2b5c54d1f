//! # Readiness probes.
//!
//! A [`Probe`] answers one question: can the dependency accept requests right
//! now? Every probe is cheap, repeatable and side-effect free:
//!
//! - [`Probe::Tcp`] connects and immediately closes.
//! - [`Probe::RedisPing`] sends an inline `PING`. A Redis that is still loading
//!   its dataset accepts connections but answers `-LOADING`, which a plain TCP
//!   probe cannot tell apart from ready.
//! - [`Probe::Command`] runs a command (e.g. `redis-cli ping`) and checks its exit code.
//!
//! Each attempt is bounded by a caller-provided budget; the readiness loop
//! passes the dependency's poll interval.

use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time;

use crate::error::ProbeError;

/// The only reply to `PING` that means the server is serving.
const READY_REPLY: &str = "+PONG";

/// Side-effect free readiness check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Probe {
    /// TCP connect-and-close.
    Tcp { host: String, port: u16 },
    /// Redis inline `PING`, ready on `+PONG`.
    RedisPing { host: String, port: u16 },
    /// Run a command; ready iff it exits with status 0.
    Command { program: String, args: Vec<String> },
}

impl Probe {
    /// TCP connect probe.
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Probe::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Redis `PING` probe.
    pub fn redis_ping(host: impl Into<String>, port: u16) -> Self {
        Probe::RedisPing {
            host: host.into(),
            port,
        }
    }

    /// Exit-code probe.
    pub fn command<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Probe::Command {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Runs one probe attempt, giving up after `budget`.
    pub async fn check(&self, budget: Duration) -> Result<(), ProbeError> {
        match time::timeout(budget, self.attempt()).await {
            Ok(res) => res,
            Err(_elapsed) => Err(ProbeError::TimedOut { budget }),
        }
    }

    async fn attempt(&self) -> Result<(), ProbeError> {
        match self {
            Probe::Tcp { host, port } => {
                let stream = TcpStream::connect((host.as_str(), *port)).await?;
                drop(stream);
                Ok(())
            }
            Probe::RedisPing { host, port } => {
                let mut stream = TcpStream::connect((host.as_str(), *port)).await?;
                stream.write_all(b"PING\r\n").await?;
                let reply = read_line(&mut stream).await?;
                if reply == READY_REPLY {
                    Ok(())
                } else {
                    Err(ProbeError::UnexpectedReply(reply))
                }
            }
            Probe::Command { program, args } => {
                let status = Command::new(program)
                    .args(args)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .kill_on_drop(true)
                    .status()
                    .await?;
                if status.success() {
                    Ok(())
                } else {
                    Err(ProbeError::CommandFailed(status))
                }
            }
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Probe::Tcp { host, port } => write!(f, "tcp://{host}:{port}"),
            Probe::RedisPing { host, port } => write!(f, "redis-ping://{host}:{port}"),
            Probe::Command { program, args } => {
                write!(f, "exec:{program}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                Ok(())
            }
        }
    }
}

/// Reads a single RESP line (without the trailing CRLF).
async fn read_line(stream: &mut TcpStream) -> Result<String, ProbeError> {
    let mut buf = Vec::with_capacity(64);
    let mut chunk = [0u8; 64];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(ProbeError::UnexpectedReply(
                String::from_utf8_lossy(&buf).into_owned(),
            ));
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(2).position(|w| w == b"\r\n") {
            return Ok(String::from_utf8_lossy(&buf[..end]).into_owned());
        }
        if buf.len() > 512 {
            return Err(ProbeError::UnexpectedReply(
                String::from_utf8_lossy(&buf).into_owned(),
            ));
        }
    }
}
