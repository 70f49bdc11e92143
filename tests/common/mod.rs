//! Common test utilities and helpers

#![allow(dead_code)]

use handoff_core::{HandoffConfig, HandoffServer};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A temp directory holding a capture file
pub struct CaptureFixture {
    pub dir: TempDir,
    pub capture: PathBuf,
    pub destination: PathBuf,
}

/// Create a temp dir with `capture123.png` holding `bytes`
pub fn create_capture(bytes: &[u8]) -> CaptureFixture {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let capture = dir.path().join("capture123.png");
    let destination = dir.path().join("out.png");
    std::fs::write(&capture, bytes).expect("Failed to write capture");
    CaptureFixture {
        dir,
        capture,
        destination,
    }
}

/// Ten bytes that look like the start of a PNG
pub const PNG_LIKE: [u8; 10] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x01];

/// Bind a server on an OS-chosen port and return it with a matching client config
pub async fn bind_server(destination: &Path) -> (HandoffServer, HandoffConfig) {
    let server = HandoffServer::bind(&HandoffConfig::with_port(0), destination)
        .await
        .expect("Failed to bind test server");
    let config = HandoffConfig::with_port(server.local_addr().port());
    (server, config)
}

/// A port with nothing listening on it (at the moment of the call)
pub async fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind throwaway listener");
    listener
        .local_addr()
        .expect("Failed to read throwaway address")
        .port()
}
