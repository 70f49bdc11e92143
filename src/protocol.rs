//! Wire protocol between the capture side and the waiting server
//!
//! One connection carries one request line and one reply line, each a JSON
//! document terminated by `\n`:
//!
//! ```text
//! -> {"command":"send","args":{"source_path":"/tmp/capture123.png"}}
//! <- {"status":"ok"}
//! <- {"status":"failed","class":"copy","message":"..."}
//! ```

use crate::error::{FailureClass, HandoffError, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Longest frame accepted from the peer, newline included
pub const MAX_FRAME_BYTES: u64 = 64 * 1024;

/// Payload of the single call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Path of the captured file, as seen by the caller
    pub source_path: String,
}

/// Command sent over the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "args")]
pub enum TransferCommand {
    /// Hand the file at `source_path` to the server
    #[serde(rename = "send")]
    Send(TransferRequest),
}

/// Reply to a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransferReply {
    Ok,
    Failed { class: FailureClass, message: String },
}

impl TransferReply {
    /// Build the reply for a servicing result
    pub fn from_result(result: &Result<()>) -> Self {
        match result {
            Ok(()) => TransferReply::Ok,
            Err(e) => TransferReply::Failed {
                class: e.class(),
                message: e.to_string(),
            },
        }
    }

    /// Turn a reply back into a result on the calling side
    pub fn into_result(self) -> Result<()> {
        match self {
            TransferReply::Ok => Ok(()),
            TransferReply::Failed { class, message } => Err(HandoffError::Call { class, message }),
        }
    }
}

/// Read one newline-terminated JSON frame
///
/// Returns `Ok(None)` if the peer closed the connection before sending anything.
pub async fn read_frame<R, T>(reader: &mut R) -> Result<Option<T>>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    let mut line = String::new();
    let read = reader.take(MAX_FRAME_BYTES).read_line(&mut line).await?;
    if read == 0 {
        return Ok(None);
    }
    if !line.ends_with('\n') {
        if read as u64 >= MAX_FRAME_BYTES {
            return Err(HandoffError::Protocol(format!(
                "Frame exceeds {} bytes",
                MAX_FRAME_BYTES
            )));
        }
        return Err(HandoffError::Protocol(
            "Connection closed mid-frame".to_string(),
        ));
    }

    let frame = serde_json::from_str(line.trim_end()).map_err(|e| {
        HandoffError::Protocol(format!("Invalid frame {:?}: {}", line.trim_end(), e))
    })?;
    Ok(Some(frame))
}

/// Write one frame followed by the newline delimiter, then flush
pub async fn write_frame<W, T>(writer: &mut W, frame: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let json = serde_json::to_string(frame)?;
    writer.write_all(json.as_bytes()).await?;
    // Write newline delimiter
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[test]
    fn test_command_wire_shape() {
        let command = TransferCommand::Send(TransferRequest {
            source_path: "/tmp/capture123.png".to_string(),
        });
        let json = serde_json::to_string(&command).unwrap();
        assert_eq!(
            json,
            r#"{"command":"send","args":{"source_path":"/tmp/capture123.png"}}"#
        );
    }

    #[test]
    fn test_reply_wire_shape() {
        assert_eq!(
            serde_json::to_string(&TransferReply::Ok).unwrap(),
            r#"{"status":"ok"}"#
        );

        let failed = TransferReply::Failed {
            class: FailureClass::Copy,
            message: "nope".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&failed).unwrap(),
            r#"{"status":"failed","class":"copy","message":"nope"}"#
        );
    }

    #[test]
    fn test_failed_reply_becomes_call_error() {
        let err = TransferReply::Failed {
            class: FailureClass::Removal,
            message: "busy".to_string(),
        }
        .into_result()
        .unwrap_err();

        match err {
            HandoffError::Call { class, message } => {
                assert_eq!(class, FailureClass::Removal);
                assert_eq!(message, "busy");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_frame_parses_request() {
        let input = b"{\"command\":\"send\",\"args\":{\"source_path\":\"a.png\"}}\n";
        let mut reader = BufReader::new(&input[..]);

        let command: Option<TransferCommand> = read_frame(&mut reader).await.unwrap();
        assert_eq!(
            command,
            Some(TransferCommand::Send(TransferRequest {
                source_path: "a.png".to_string()
            }))
        );
    }

    #[tokio::test]
    async fn test_read_frame_on_closed_connection() {
        let mut reader = BufReader::new(&b""[..]);
        let frame: Option<TransferReply> = read_frame(&mut reader).await.unwrap();
        assert!(frame.is_none());
    }

    #[tokio::test]
    async fn test_read_frame_rejects_garbage() {
        let mut reader = BufReader::new(&b"GET / HTTP/1.1\r\n"[..]);
        let result: Result<Option<TransferCommand>> = read_frame(&mut reader).await;
        assert!(matches!(result, Err(HandoffError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_read_frame_rejects_truncated_frame() {
        let mut reader = BufReader::new(&b"{\"status\":"[..]);
        let result: Result<Option<TransferReply>> = read_frame(&mut reader).await;
        assert!(matches!(result, Err(HandoffError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_read_frame_rejects_oversized_frame() {
        let input = vec![b'a'; MAX_FRAME_BYTES as usize + 10];
        let mut reader = BufReader::new(&input[..]);
        let result: Result<Option<TransferReply>> = read_frame(&mut reader).await;
        assert!(matches!(result, Err(HandoffError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_write_frame_appends_newline() {
        let mut out: Vec<u8> = Vec::new();
        write_frame(&mut out, &TransferReply::Ok).await.unwrap();
        assert_eq!(out, b"{\"status\":\"ok\"}\n");
    }
}
