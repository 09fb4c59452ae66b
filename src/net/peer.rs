use std::net::SocketAddr;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::frame::{read_frame, write_frame, FrameError};
use super::messages::Message;

const LOG_TARGET: &str = "net::peer";

#[derive(Error, Debug)]
pub enum NetError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One TCP peer. A dedicated reader task blocks on the socket and hands
/// decoded messages into a channel; the session task drains that channel, so
/// the engine is only ever mutated from one logical thread.
pub struct PeerConnection {
    writer: Box<dyn AsyncWrite + Send + Unpin>,
    incoming: mpsc::UnboundedReceiver<Message>,
}

impl PeerConnection {
    /// Bind and wait for the single joiner.
    pub async fn host(addr: SocketAddr) -> Result<Self, NetError> {
        let listener = TcpListener::bind(addr).await.map_err(FrameError::Io)?;
        info!(target = LOG_TARGET, %addr, "waiting for a joiner");
        let (stream, remote) = listener.accept().await.map_err(FrameError::Io)?;
        info!(target = LOG_TARGET, %remote, "joiner connected");
        Ok(Self::from_tcp(stream))
    }

    pub async fn join(addr: SocketAddr) -> Result<Self, NetError> {
        let stream = TcpStream::connect(addr).await.map_err(FrameError::Io)?;
        info!(target = LOG_TARGET, %addr, "connected to host");
        Ok(Self::from_tcp(stream))
    }

    fn from_tcp(stream: TcpStream) -> Self {
        let (reader, writer) = stream.into_split();
        Self::from_split(reader, writer)
    }

    /// Build a connection over arbitrary halves; tests pair these over an
    /// in-memory duplex pipe.
    pub fn from_split<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(read_loop(reader, tx));
        Self {
            writer: Box::new(writer),
            incoming: rx,
        }
    }

    pub async fn send(&mut self, message: &Message) -> Result<(), NetError> {
        let body = serde_json::to_vec(message)?;
        write_frame(&mut self.writer, &body).await?;
        Ok(())
    }

    /// Next decoded message, or `None` once the connection is gone.
    pub async fn recv(&mut self) -> Option<Message> {
        self.incoming.recv().await
    }

    pub async fn shutdown(&mut self) {
        let _ = self.writer.shutdown().await;
    }
}

/// Reader side: framing errors end the session, malformed payloads are
/// logged and dropped without touching any state.
async fn read_loop<R>(mut reader: R, tx: mpsc::UnboundedSender<Message>)
where
    R: AsyncRead + Unpin,
{
    loop {
        let body = match read_frame(&mut reader).await {
            Ok(body) => body,
            Err(FrameError::ConnectionClosed) => {
                info!(target = LOG_TARGET, "connection closed by peer");
                break;
            }
            Err(e) => {
                warn!(target = LOG_TARGET, error = %e, "read failed, closing");
                break;
            }
        };
        match serde_json::from_slice::<Message>(&body) {
            Ok(message) => {
                debug!(target = LOG_TARGET, ?message, "received");
                if tx.send(message).is_err() {
                    // session went away first
                    break;
                }
            }
            Err(e) => {
                warn!(
                    target = LOG_TARGET,
                    error = %e,
                    len = body.len(),
                    "malformed payload dropped"
                );
            }
        }
    }
}
