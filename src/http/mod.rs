//! HTTP protocol implementation.
//!
//! This module implements the request/response side of a one-shot HTTP/1.1
//! server: every connection carries exactly one request and is then closed.
//!
//! # Architecture
//!
//! - **`connection`**: The connection handler implementing the request-response state machine
//! - **`parser`**: Frames and parses incoming HTTP requests from byte buffers
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Read until the request frame is complete
//!        └──────┬──────┘
//!               │ Bytes received          (nothing received → Closed)
//!               ▼
//!        ┌──────────────────┐
//!        │     Parsed       │ ← Request built from the bytes
//!        └──────┬───────────┘
//!               │ Handler resolved
//!               ▼
//!        ┌──────────────────┐
//!        │     Routed       │ ← Handler produces the response
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │   Responding     │ ← Send response to client
//!        └──────┬───────────┘
//!               ▼
//!            Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use courier::http::connection::{Connection, ConnectionLimits};
//! use courier::server::Router;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let router = Arc::new(Router::new());
//!
//!     loop {
//!         let (socket, addr) = listener.accept().await?;
//!         let router = Arc::clone(&router);
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, Some(addr), router, ConnectionLimits::default());
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
