//! Newline-delimited JSON framing for handshake messages.

use std::time::Duration;

use muster_common::constants::MAX_MESSAGE_BYTES;
use muster_common::{HandshakeMessage, MusterError};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Write one handshake frame and flush it
pub async fn write_message<W>(writer: &mut W, message: &HandshakeMessage) -> Result<(), MusterError>
where
    W: AsyncWrite + Unpin,
{
    let frame = message.encode()?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one handshake frame, optionally bounded by `limit`.
///
/// A frame ends at the first newline or at EOF.
pub async fn read_message<R>(
    reader: &mut R,
    limit: Option<Duration>,
) -> Result<HandshakeMessage, MusterError>
where
    R: AsyncRead + Unpin,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, read_frame(reader))
            .await
            .map_err(|_| MusterError::Timeout(format!("no handshake frame within {limit:?}")))?,
        None => read_frame(reader).await,
    }
}

async fn read_frame<R>(reader: &mut R) -> Result<HandshakeMessage, MusterError>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader.take(MAX_MESSAGE_BYTES as u64 + 1));
    let mut frame = Vec::new();
    reader.read_until(b'\n', &mut frame).await?;

    if frame.len() > MAX_MESSAGE_BYTES {
        return Err(MusterError::Decode(format!(
            "handshake frame exceeds {MAX_MESSAGE_BYTES} bytes"
        )));
    }
    if frame.is_empty() {
        return Err(MusterError::Decode(
            "connection closed before a handshake frame arrived".to_string(),
        ));
    }

    HandshakeMessage::decode(&frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use muster_common::NodeIdentity;

    fn request() -> HandshakeMessage {
        HandshakeMessage::request(
            NodeIdentity::new(1, "10.0.0.1", "8001"),
            NodeIdentity::new(-1, "10.0.0.2", "8001"),
        )
    }

    #[tokio::test]
    async fn test_frame_over_duplex() {
        let (mut a, mut b) = tokio::io::duplex(1024);
        write_message(&mut a, &request()).await.unwrap();

        let received = read_message(&mut b, None).await.unwrap();
        assert_eq!(received, request());
    }

    #[tokio::test]
    async fn test_frame_without_newline_ends_at_eof() {
        let json = serde_json::to_vec(&request()).unwrap();
        let mut reader = json.as_slice();

        let received = read_message(&mut reader, None).await.unwrap();
        assert_eq!(received.text, "join request");
    }

    #[tokio::test]
    async fn test_only_first_frame_is_read() {
        let mut bytes = request().encode().unwrap();
        bytes.extend_from_slice(b"trailing garbage\n");
        let mut reader = bytes.as_slice();

        assert_eq!(read_message(&mut reader, None).await.unwrap(), request());
    }

    #[tokio::test]
    async fn test_eof_is_decode_error() {
        let mut reader: &[u8] = b"";
        let err = read_message(&mut reader, None).await.unwrap_err();
        assert!(matches!(err, MusterError::Decode(_)));
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let bytes = vec![b'x'; MAX_MESSAGE_BYTES + 10];
        let mut reader = bytes.as_slice();
        let err = read_message(&mut reader, None).await.unwrap_err();
        assert!(matches!(err, MusterError::Decode(ref m) if m.contains("exceeds")));
    }

    #[tokio::test]
    async fn test_read_times_out() {
        let (_writer, mut reader) = tokio::io::duplex(64);
        let err = read_message(&mut reader, Some(Duration::from_millis(50)))
            .await
            .unwrap_err();
        assert!(matches!(err, MusterError::Timeout(_)));
    }
}
