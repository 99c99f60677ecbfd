use anyhow::Context;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Serializes the status line and framing headers, up to and including the
/// blank line that ends the header block.
pub fn serialize_head(resp: &Response) -> Vec<u8> {
    format!(
        "{} {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase(),
        resp.content_type,
        resp.content_length(),
    )
    .into_bytes()
}

/// Serializes a whole response: head followed by the body bytes verbatim.
pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let mut buf = serialize_head(resp);
    buf.extend_from_slice(&resp.body);
    buf
}

/// Writes one response to a stream, head first and then the body.
pub struct ResponseWriter {
    head: Vec<u8>,
    body: Vec<u8>,
}

impl ResponseWriter {
    pub fn new(response: Response) -> Self {
        Self {
            head: serialize_head(&response),
            body: response.body,
        }
    }

    /// Total bytes this writer puts on the wire.
    pub fn len(&self) -> usize {
        self.head.len() + self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sends the head, then the body if there is one. A failed head write
    /// aborts before any body byte is sent. Nothing is retried.
    pub async fn write_to_stream<W>(&self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        stream
            .write_all(&self.head)
            .await
            .context("failed to write response headers")?;

        if !self.body.is_empty() {
            stream
                .write_all(&self.body)
                .await
                .context("failed to write response body")?;
        }

        stream.flush().await.context("failed to flush response")?;
        Ok(())
    }
}
