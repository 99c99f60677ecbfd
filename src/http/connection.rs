use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::config::ServerConfig;
use crate::http::parser::{FrameStatus, frame_status, parse_http_request};
use crate::http::request::Request;
use crate::http::writer::ResponseWriter;
use crate::server::router::{Handler, Router};

const READ_CHUNK: usize = 4096;

/// Per-connection bounds on socket I/O.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionLimits {
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub max_request_size: usize,
}

impl Default for ConnectionLimits {
    fn default() -> Self {
        (&ServerConfig::default()).into()
    }
}

impl From<&ServerConfig> for ConnectionLimits {
    fn from(cfg: &ServerConfig) -> Self {
        Self {
            read_timeout: Duration::from_millis(cfg.read_timeout_ms),
            write_timeout: Duration::from_millis(cfg.write_timeout_ms),
            max_request_size: cfg.max_request_size,
        }
    }
}

/// One accepted socket, driven through a single request/response cycle.
pub struct Connection<S> {
    stream: S,
    peer: Option<SocketAddr>,
    router: Arc<Router>,
    limits: ConnectionLimits,
    buffer: BytesMut,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Parsed(Request),
    Routed(Request, Arc<dyn Handler>),
    Responding(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: Option<SocketAddr>, router: Arc<Router>, limits: ConnectionLimits) -> Self {
        Self {
            stream,
            peer,
            router,
            limits,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            state: ConnectionState::Reading,
        }
    }

    /// Runs the connection to `Closed`. The stream is shut down on every path;
    /// a read or write failure is returned after that.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut outcome = Ok(());

        loop {
            self.state = match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => match self.read_request().await {
                    Ok(true) => {
                        let mut request = parse_http_request(&self.buffer);
                        request.client_ip = self.peer.map(|p| p.ip().to_string());
                        ConnectionState::Parsed(request)
                    }
                    Ok(false) => ConnectionState::Closed,
                    Err(e) => {
                        outcome = Err(e);
                        ConnectionState::Closed
                    }
                },

                ConnectionState::Parsed(request) => {
                    let handler = self.router.route(request.method, &request.path);
                    ConnectionState::Routed(request, handler)
                }

                ConnectionState::Routed(request, handler) => {
                    let response = handler.handle(&request);
                    tracing::info!(
                        method = %request.method,
                        path = %request.path,
                        status = response.status.as_u16(),
                        reason = response.status.reason_phrase(),
                        content_type = %response.content_type,
                        content_length = response.content_length(),
                        "Handled request"
                    );
                    ConnectionState::Responding(ResponseWriter::new(response))
                }

                ConnectionState::Responding(writer) => {
                    match timeout(self.limits.write_timeout, writer.write_to_stream(&mut self.stream)).await {
                        Ok(Ok(())) => {
                            tracing::debug!(bytes = writer.len(), "Response sent");
                        }
                        Ok(Err(e)) => outcome = Err(e),
                        Err(_) => outcome = Err(anyhow::anyhow!("timed out writing response")),
                    }
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(error = %e, "Socket shutdown failed");
        }
        self.buffer.clear();

        outcome
    }

    /// Reads until a whole request frame has arrived, the peer stops sending,
    /// the read times out, or `max_request_size` is reached.
    ///
    /// Returns `false` when nothing at all was received.
    pub async fn read_request(&mut self) -> anyhow::Result<bool> {
        let mut temp = [0u8; READ_CHUNK];

        loop {
            if let FrameStatus::Complete(_) = frame_status(&self.buffer) {
                break;
            }

            let remaining = self.limits.max_request_size.saturating_sub(self.buffer.len());
            if remaining == 0 {
                tracing::warn!(limit = self.limits.max_request_size, "Request exceeds size limit, parsing what arrived");
                break;
            }

            let want = remaining.min(READ_CHUNK);
            let n = match timeout(self.limits.read_timeout, self.stream.read(&mut temp[..want])).await {
                Ok(read) => read?,
                Err(_) => {
                    tracing::debug!(received = self.buffer.len(), "Read timed out");
                    break;
                }
            };

            if n == 0 {
                // Peer closed or half-closed its side
                break;
            }

            self.buffer.extend_from_slice(&temp[..n]);
            tracing::trace!(bytes = n, raw = %String::from_utf8_lossy(&temp[..n]), "Received data");
        }

        if self.buffer.is_empty() {
            tracing::debug!("Client closed connection without sending data");
            return Ok(false);
        }
        Ok(true)
    }
}
