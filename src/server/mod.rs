//! Socket-facing side of the server: listener loop, routing and shutdown.

pub mod listener;
pub mod router;
pub mod shutdown;
pub mod signals;

pub use router::{Handler, Router};
pub use shutdown::Shutdown;
