//! Handoff - single-shot local file hand-off
//!
//! A capture tool hands the path of a freshly captured image to an editor
//! that is already waiting for it:
//! - The editor side binds a local TCP port and waits for exactly one request
//! - The capture side connects, sends the path, and exits
//! - The server copies the file to its configured destination, removes the
//!   source, answers, and terminates
//!
//! # Architecture
//!
//! - **Protocol**: newline-delimited JSON frames (`protocol`)
//! - **Endpoint**: the one `send` call and its file transfer (`endpoint`, `transfer`)
//! - **Server**: bind, background accept loop, completion gate (`server`, `signal`)
//! - **Client**: the outbound call (`client`)
//!
//! # Example
//!
//! ```no_run
//! use handoff_core::{client, HandoffConfig, HandoffServer};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> handoff_core::Result<()> {
//!     let config = HandoffConfig::default();
//!     let server = HandoffServer::bind(&config, "/tmp/out.png").await?;
//!     let waiting = tokio::spawn(server.run());
//!
//!     client::send_path(&config, Path::new("/tmp/capture123.png")).await?;
//!     let outcome = waiting.await.expect("server task panicked")?;
//!     assert!(outcome.is_success());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod protocol;
pub mod report;
pub mod server;
pub mod signal;
pub mod transfer;

// Re-export commonly used types
pub use client::HandoffClient;
pub use config::{HandoffConfig, DEFAULT_PORT};
pub use endpoint::{ServerState, TransferEndpoint, TransferOutcome};
pub use error::{FailureClass, HandoffError, Result};
pub use protocol::{TransferCommand, TransferReply, TransferRequest};
pub use server::{HandoffServer, ServerPhase};
