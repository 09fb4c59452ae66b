//! Length-prefixed framing: a 4-byte big-endian length header followed by
//! that many bytes of UTF-8 JSON.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on a single frame body. A full snapshot is a few kilobytes;
/// anything near this limit is a broken or hostile peer.
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

#[derive(Error, Debug)]
pub enum FrameError {
    /// Short read on the header or body: the connection is dead.
    #[error("connection closed mid-frame")]
    ConnectionClosed,

    #[error("frame of {len} bytes exceeds the {MAX_FRAME_SIZE} byte limit")]
    Oversize { len: usize },

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read one frame body. Fails with [`FrameError::ConnectionClosed`] on any
/// short read, including a clean EOF between frames.
pub async fn read_frame<R>(reader: &mut R) -> Result<Vec<u8>, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    read_exact_or_closed(reader, &mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(FrameError::Oversize { len });
    }
    let mut body = vec![0u8; len];
    read_exact_or_closed(reader, &mut body).await?;
    Ok(body)
}

pub async fn write_frame<W>(writer: &mut W, body: &[u8]) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let len = body.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}

async fn read_exact_or_closed<R>(reader: &mut R, buf: &mut [u8]) -> Result<(), FrameError>
where
    R: AsyncRead + Unpin,
{
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(FrameError::ConnectionClosed)
        }
        Err(e) => Err(FrameError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frames_round_trip_over_a_duplex_pipe() {
        let (mut a, mut b) = tokio::io::duplex(256);
        write_frame(&mut a, br#"{"action":"startGame"}"#).await.unwrap();
        let body = read_frame(&mut b).await.unwrap();
        assert_eq!(body, br#"{"action":"startGame"}"#);
    }

    #[tokio::test]
    async fn truncated_header_reads_as_connection_closed() {
        let (mut a, mut b) = tokio::io::duplex(256);
        tokio::io::AsyncWriteExt::write_all(&mut a, &[0, 0]).await.unwrap();
        drop(a);
        let err = read_frame(&mut b).await.unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[tokio::test]
    async fn truncated_body_reads_as_connection_closed() {
        let (mut a, mut b) = tokio::io::duplex(256);
        tokio::io::AsyncWriteExt::write_all(&mut a, &8u32.to_be_bytes())
            .await
            .unwrap();
        tokio::io::AsyncWriteExt::write_all(&mut a, b"abc").await.unwrap();
        drop(a);
        let err = read_frame(&mut b).await.unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[tokio::test]
    async fn oversize_length_prefix_is_rejected() {
        let (mut a, mut b) = tokio::io::duplex(256);
        tokio::io::AsyncWriteExt::write_all(&mut a, &u32::MAX.to_be_bytes())
            .await
            .unwrap();
        let err = read_frame(&mut b).await.unwrap_err();
        assert!(matches!(err, FrameError::Oversize { .. }));
    }
}
