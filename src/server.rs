//! One-shot hand-off server
//!
//! Binds the configured port, accepts connections on a background task and
//! parks the caller until the single expected request has been serviced.
//!
//! # Usage
//! ```no_run
//! use handoff_core::{HandoffConfig, HandoffServer};
//!
//! #[tokio::main]
//! async fn main() -> handoff_core::Result<()> {
//!     let server = HandoffServer::bind(&HandoffConfig::default(), "/tmp/out.png").await?;
//!     let outcome = server.run().await?;
//!     println!("serviced {}", outcome.source_path.display());
//!     Ok(())
//! }
//! ```

use crate::config::HandoffConfig;
use crate::endpoint::{ServerState, TransferEndpoint, TransferOutcome};
use crate::error::{HandoffError, Result};
use crate::protocol::{read_frame, write_frame, TransferCommand, TransferReply};
use crate::signal::{completion_pair, CompletionWaiter};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

/// Lifecycle phase of the server process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerPhase {
    Starting,
    Listening,
    AwaitingRequest,
    Servicing,
    Terminated,
}

impl fmt::Display for ServerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServerPhase::Starting => "starting",
            ServerPhase::Listening => "listening",
            ServerPhase::AwaitingRequest => "awaiting request",
            ServerPhase::Servicing => "servicing",
            ServerPhase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// A bound server that has not started accepting yet
pub struct HandoffServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    endpoint: Arc<TransferEndpoint>,
    waiter: CompletionWaiter<TransferOutcome>,
}

impl HandoffServer {
    /// Bind the configured address for a transfer into `destination`
    ///
    /// A bind failure is fatal and never retried.
    pub async fn bind(config: &HandoffConfig, destination: impl Into<PathBuf>) -> Result<Self> {
        let destination = destination.into();
        let addr = config.listen_addr();
        debug!("Server {}", ServerPhase::Starting);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| HandoffError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| HandoffError::Bind { addr, source })?;

        let (signal, waiter) = completion_pair();
        let endpoint = Arc::new(TransferEndpoint::new(ServerState::new(destination, signal)));

        info!(
            "Server {} on {}, destination {}",
            ServerPhase::Listening,
            local_addr,
            endpoint.destination_path().display()
        );

        Ok(Self {
            listener,
            local_addr,
            endpoint,
            waiter,
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Destination the transferred file will be written to
    pub fn destination(&self) -> &Path {
        self.endpoint.destination_path()
    }

    /// Accept in the background and park until one request has been serviced
    ///
    /// There is no timeout: if nobody calls, this never returns.
    pub async fn run(self) -> Result<TransferOutcome> {
        let HandoffServer {
            listener,
            local_addr,
            endpoint,
            waiter,
        } = self;

        let accept_task = tokio::spawn(accept_loop(listener, endpoint));
        info!("Server {} on {}", ServerPhase::AwaitingRequest, local_addr);

        let outcome = waiter.wait().await;
        accept_task.abort();

        info!("Server {}", ServerPhase::Terminated);
        outcome
    }
}

/// Pause after a failed accept, doubling per consecutive failure up to one second
fn accept_backoff(consecutive_failures: u32) -> Duration {
    let millis = 10u64.saturating_mul(1u64 << consecutive_failures.min(7));
    Duration::from_millis(millis.min(1000))
}

async fn accept_loop(listener: TcpListener, endpoint: Arc<TransferEndpoint>) {
    let mut failures: u32 = 0;
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                failures = 0;
                debug!("Accepted connection from {}", peer);
                let endpoint = endpoint.clone();
                tokio::spawn(async move {
                    if let Err(e) = serve_connection(stream, &endpoint).await {
                        warn!("Connection from {} ended with error: {}", peer, e);
                    }
                });
            }
            Err(e) => {
                // EMFILE and friends keep failing until something is released
                let pause = accept_backoff(failures);
                error!("Failed to accept connection: {} (retrying in {:?})", e, pause);
                failures = failures.saturating_add(1);
                tokio::time::sleep(pause).await;
            }
        }
    }
}

/// Read one command, service it, reply, then raise completion
///
/// Connections that close early or send garbage never raise completion.
async fn serve_connection(mut stream: TcpStream, endpoint: &TransferEndpoint) -> Result<()> {
    let (reader, mut writer) = stream.split();
    let mut reader = BufReader::new(reader);

    let command: TransferCommand = match read_frame(&mut reader).await {
        Ok(Some(command)) => command,
        Ok(None) => {
            debug!("Connection closed without a request");
            return Ok(());
        }
        Err(e) => {
            let reply = TransferReply::Failed {
                class: e.class(),
                message: e.to_string(),
            };
            // Best effort; the peer may already be gone
            let _ = write_frame(&mut writer, &reply).await;
            return Err(e);
        }
    };

    match command {
        TransferCommand::Send(request) => {
            debug!("Server {}", ServerPhase::Servicing);
            let result = endpoint.send(&request).await;
            if let Err(e) = &result {
                warn!("Transfer of {} failed: {}", request.source_path, e);
            }

            let reply = TransferReply::from_result(&result);
            let delivered = write_frame(&mut writer, &reply).await;

            if !matches!(result, Err(HandoffError::AlreadyServiced)) {
                endpoint.complete(&request, &result)?;
            }
            delivered
        }
    }
}
