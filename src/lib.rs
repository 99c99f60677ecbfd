//! courier - a one-request-per-connection HTTP/1.1 server
//!
//! Core library for the protocol layer, routing and the handler set.

pub mod config;
pub mod handlers;
pub mod http;
pub mod server;
