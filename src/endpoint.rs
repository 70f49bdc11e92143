//! Server-side request handler
//!
//! A [`TransferEndpoint`] services exactly one [`TransferRequest`] for the
//! lifetime of the process. It owns the [`ServerState`]: the destination path
//! fixed at startup and the sending half of the completion signal.

use crate::error::{FailureClass, HandoffError, Result};
use crate::protocol::TransferRequest;
use crate::signal::CompletionSignal;
use crate::transfer;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// What the serviced request amounted to, handed to the main task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    /// Source path named by the caller
    pub source_path: PathBuf,
    /// Failure class and message, if the transfer failed
    pub failure: Option<(FailureClass, String)>,
}

impl TransferOutcome {
    fn new(request: &TransferRequest, result: &Result<()>) -> Self {
        Self {
            source_path: PathBuf::from(&request.source_path),
            failure: result
                .as_ref()
                .err()
                .map(|e| (e.class(), e.to_string())),
        }
    }

    /// Whether the file made it to the destination and the source is gone
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// State owned by one server process
#[derive(Debug)]
pub struct ServerState {
    destination_path: PathBuf,
    completion: CompletionSignal<TransferOutcome>,
}

impl ServerState {
    pub fn new(
        destination_path: impl Into<PathBuf>,
        completion: CompletionSignal<TransferOutcome>,
    ) -> Self {
        Self {
            destination_path: destination_path.into(),
            completion,
        }
    }
}

/// Handler for the single `send` call
#[derive(Debug)]
pub struct TransferEndpoint {
    state: ServerState,
    serviced: AtomicBool,
}

impl TransferEndpoint {
    pub fn new(state: ServerState) -> Self {
        Self {
            state,
            serviced: AtomicBool::new(false),
        }
    }

    /// Destination configured at startup
    pub fn destination_path(&self) -> &Path {
        &self.state.destination_path
    }

    /// Whether the completion signal has fired
    pub fn is_complete(&self) -> bool {
        self.state.completion.is_signaled()
    }

    /// Service the call: copy the source over the destination, then delete it
    ///
    /// Only the first call does any work. Later calls get
    /// [`HandoffError::AlreadyServiced`] and touch nothing.
    pub async fn send(&self, request: &TransferRequest) -> Result<()> {
        if self.serviced.swap(true, Ordering::SeqCst) {
            warn!(
                "Rejecting second transfer of {}, this server already serviced one",
                request.source_path
            );
            return Err(HandoffError::AlreadyServiced);
        }

        info!(
            "Transferring {} to {}",
            request.source_path,
            self.state.destination_path.display()
        );

        let source = Path::new(&request.source_path);
        transfer::hand_off(source, &self.state.destination_path)
            .await
            .map(|_| ())
    }

    /// Raise the completion signal for a serviced request
    ///
    /// Called once the caller has been answered, whatever `result` was.
    pub fn complete(&self, request: &TransferRequest, result: &Result<()>) -> Result<()> {
        self.state
            .completion
            .signal(TransferOutcome::new(request, result))
    }
}
