//! Error types for the hand-off
//!
//! This module provides error handling using thiserror for structured error
//! definitions. Every error maps onto a [`FailureClass`], which is what travels
//! over the wire and what the presentation layer keys its messages on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a failure, shared by both roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Server could not acquire its port
    Bind,
    /// Client could not reach the server
    Connection,
    /// The remote call returned a failure or broke mid-call
    Call,
    /// Source unreadable or destination unwritable
    Copy,
    /// Copy succeeded but the source could not be removed
    Removal,
    /// Malformed invocation
    Usage,
    /// Malformed frame or misuse of the one-shot server
    Protocol,
    /// Any other I/O failure
    Io,
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureClass::Bind => "bind",
            FailureClass::Connection => "connection",
            FailureClass::Call => "call",
            FailureClass::Copy => "copy",
            FailureClass::Removal => "removal",
            FailureClass::Usage => "usage",
            FailureClass::Protocol => "protocol",
            FailureClass::Io => "io",
        };
        f.write_str(name)
    }
}

/// Main error type for hand-off operations
#[derive(Error, Debug)]
pub enum HandoffError {
    /// Listening socket could not be bound
    #[error("Can't listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Server endpoint unreachable
    #[error("Can't connect to server at {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The server answered with a failure, or the call broke off
    #[error("Call failed ({class}): {message}")]
    Call {
        class: FailureClass,
        message: String,
    },

    /// Copying the source into the destination failed
    #[error("Failed to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Removing the source after a successful copy failed
    #[error("Failed to remove {}: {source}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed invocation
    #[error("Usage error: {0}")]
    Usage(String),

    /// Malformed frame on the wire
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Completion signal raised a second time
    #[error("Completion already signaled")]
    AlreadySignaled,

    /// A second request reached a server that already serviced one
    #[error("This server has already serviced its transfer")]
    AlreadyServiced,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl HandoffError {
    /// Classify this error
    pub fn class(&self) -> FailureClass {
        match self {
            HandoffError::Bind { .. } => FailureClass::Bind,
            HandoffError::Connect { .. } => FailureClass::Connection,
            HandoffError::Call { .. } => FailureClass::Call,
            HandoffError::Copy { .. } => FailureClass::Copy,
            HandoffError::Remove { .. } => FailureClass::Removal,
            HandoffError::Usage(_) => FailureClass::Usage,
            HandoffError::Protocol(_)
            | HandoffError::AlreadySignaled
            | HandoffError::AlreadyServiced
            | HandoffError::Serialization(_) => FailureClass::Protocol,
            HandoffError::Io(_) | HandoffError::Other(_) => FailureClass::Io,
        }
    }
}

/// Result type alias for hand-off operations
pub type Result<T> = std::result::Result<T, HandoffError>;
