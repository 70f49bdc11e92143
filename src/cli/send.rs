//! Client role: deliver a capture to the waiting server

use super::{EXIT_FAIL, EXIT_OK, EXIT_USAGE};
use handoff_core::client;
use handoff_core::report::{headline, FailureReporter};
use handoff_core::{FailureClass, HandoffConfig};
use std::path::Path;

/// Handle the client role, returning the process exit code
pub async fn handle(config: &HandoffConfig, source: &Path, reporter: &dyn FailureReporter) -> u8 {
    match client::send_path(config, source).await {
        Ok(()) => EXIT_OK,
        Err(e) => {
            reporter.report(&headline(e.class(), config.port), &e);
            match e.class() {
                FailureClass::Usage => EXIT_USAGE,
                _ => EXIT_FAIL,
            }
        }
    }
}
