//! Server role: wait for one capture and write it to the destination

use super::{EXIT_FAIL, EXIT_OK};
use handoff_core::report::{headline, FailureReporter};
use handoff_core::{HandoffConfig, HandoffServer};
use std::path::PathBuf;
use tracing::{info, warn};

/// Handle the server role, returning the process exit code
pub async fn handle(
    config: &HandoffConfig,
    destination: PathBuf,
    reporter: &dyn FailureReporter,
) -> u8 {
    let server = match HandoffServer::bind(config, destination).await {
        Ok(server) => server,
        Err(e) => {
            reporter.report(&headline(e.class(), config.port), &e);
            return EXIT_FAIL;
        }
    };

    match server.run().await {
        Ok(outcome) => {
            match &outcome.failure {
                None => info!("Received {}", outcome.source_path.display()),
                Some((class, message)) => warn!(
                    "Request for {} failed ({}): {}",
                    outcome.source_path.display(),
                    class,
                    message
                ),
            }
            EXIT_OK
        }
        Err(e) => {
            reporter.report(&headline(e.class(), config.port), &e);
            EXIT_FAIL
        }
    }
}
