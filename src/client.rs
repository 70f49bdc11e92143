//! Client side of the hand-off, run on behalf of the capture tool

use crate::config::HandoffConfig;
use crate::error::{FailureClass, HandoffError, Result};
use crate::protocol::{read_frame, write_frame, TransferCommand, TransferReply, TransferRequest};
use std::path::Path;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tracing::{debug, info};

/// Connection to a waiting hand-off server
pub struct HandoffClient {
    stream: TcpStream,
}

impl HandoffClient {
    /// Connect to the configured server; no retries
    pub async fn connect(config: &HandoffConfig) -> Result<Self> {
        let addr = config.connect_addr();
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| HandoffError::Connect { addr, source })?;
        debug!("Connected to hand-off server at {}", addr);
        Ok(Self { stream })
    }

    /// Issue the single call and wait for its reply
    pub async fn send(&mut self, request: &TransferRequest) -> Result<()> {
        if request.source_path.is_empty() {
            return Err(HandoffError::Usage(
                "source path must not be empty".to_string(),
            ));
        }

        let (reader, mut writer) = self.stream.split();
        let command = TransferCommand::Send(request.clone());
        write_frame(&mut writer, &command)
            .await
            .map_err(broken_call)?;

        let mut reader = BufReader::new(reader);
        let reply: TransferReply = read_frame(&mut reader)
            .await
            .map_err(broken_call)?
            .ok_or_else(|| HandoffError::Call {
                class: FailureClass::Connection,
                message: "Server closed the connection without replying".to_string(),
            })?;

        reply.into_result()?;
        info!("Server accepted {}", request.source_path);
        Ok(())
    }
}

/// Connect and send `source_path` in one go
///
/// A relative path is resolved against this process's working directory, since
/// the server does not share it.
pub async fn send_path(config: &HandoffConfig, source_path: &Path) -> Result<()> {
    if source_path.as_os_str().is_empty() {
        return Err(HandoffError::Usage(
            "source path must not be empty".to_string(),
        ));
    }
    let absolute = std::path::absolute(source_path)?;
    let source_path = absolute
        .into_os_string()
        .into_string()
        .map_err(|_| HandoffError::Usage("source path is not valid UTF-8".to_string()))?;
    let request = TransferRequest { source_path };

    let mut client = HandoffClient::connect(config).await?;
    client.send(&request).await
}

fn broken_call(err: HandoffError) -> HandoffError {
    match err {
        HandoffError::Call { .. } => err,
        other => HandoffError::Call {
            class: other.class(),
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    async fn unused_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn test_connect_without_server() {
        let config = HandoffConfig::with_port(unused_port().await);
        let err = HandoffClient::connect(&config).await.err().unwrap();
        assert_eq!(err.class(), FailureClass::Connection);
    }

    #[tokio::test]
    async fn test_send_path_without_server_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("capture.png");
        std::fs::write(&src, b"data").unwrap();

        let config = HandoffConfig::with_port(unused_port().await);
        let err = send_path(&config, &src).await.unwrap_err();

        assert_eq!(err.class(), FailureClass::Connection);
        assert_eq!(std::fs::read(&src).unwrap(), b"data");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_empty_path_is_usage_error() {
        let config = HandoffConfig::with_port(unused_port().await);
        let err = send_path(&config, Path::new("")).await.unwrap_err();
        assert_eq!(err.class(), FailureClass::Usage);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_non_utf8_path_is_usage_error_before_connecting() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let src = dir.path().join(OsStr::from_bytes(b"cap\xffture.png"));
        std::fs::write(&src, b"data").unwrap();

        // Nothing listens here; a usage error proves no connection was tried
        let config = HandoffConfig::with_port(unused_port().await);
        let err = send_path(&config, &src).await.unwrap_err();

        assert_eq!(err.class(), FailureClass::Usage);
        assert_eq!(std::fs::read(&src).unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_server_hanging_up_is_call_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let _ = stream.shutdown().await;
        });

        let mut client = HandoffClient::connect(&HandoffConfig::with_port(port))
            .await
            .unwrap();
        let err = client
            .send(&TransferRequest {
                source_path: "/tmp/capture.png".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.class(), FailureClass::Call);
    }
}
