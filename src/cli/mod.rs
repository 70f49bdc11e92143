//! CLI command handlers
//!
//! `handoff <DESTINATION>` waits for a capture, `handoff --send <PATH>` delivers
//! one. Each role lives in its own module.

pub mod send;
pub mod serve;

use clap::Parser;
use handoff_core::{HandoffConfig, HandoffError, Result, DEFAULT_PORT};
use std::path::PathBuf;

pub const PROGRAM_NAME: &str = "handoff";
pub const EXIT_OK: u8 = 0;
pub const EXIT_FAIL: u8 = 1;
pub const EXIT_USAGE: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "handoff")]
#[command(about = "Hand a freshly captured image to a waiting editor", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Where the received file is written (runs the waiting server)
    #[arg(value_name = "DESTINATION")]
    pub destination: Option<PathBuf>,

    /// Path of the capture to send (runs the client)
    #[arg(long, value_name = "PATH", conflicts_with = "destination")]
    pub send: Option<PathBuf>,

    /// TCP port to use
    #[arg(short, long, env = "HANDOFF_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Set log level
    #[arg(short, long, default_value = "warn")]
    pub log_level: String,
}

/// Which side of the hand-off this invocation plays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Serve(PathBuf),
    Send(PathBuf),
}

impl Cli {
    /// Resolve the invocation shape into a role
    pub fn role(&self) -> Result<Role> {
        match (&self.send, &self.destination) {
            (Some(path), None) if path.as_os_str().is_empty() => Err(HandoffError::Usage(
                "source path must not be empty".to_string(),
            )),
            (Some(path), None) => Ok(Role::Send(path.clone())),
            (None, Some(destination)) => Ok(Role::Serve(destination.clone())),
            _ => Err(HandoffError::Usage(
                "Must be called with one argument".to_string(),
            )),
        }
    }

    pub fn config(&self) -> HandoffConfig {
        HandoffConfig::with_port(self.port)
    }
}
