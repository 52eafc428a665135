//! Relay proxy subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (?url=<absolute-url>)
//!     → handler.rs (preflight, method and url checks)
//!     → transport.rs (scheme → plain TCP or TLS, fresh connection, GET)
//!     → handler.rs (status + content type, body streamed through)
//!     → Client
//!
//! Any transport failure before the response head:
//!     → error.rs → 500 "Proxy error: <message>"
//! ```
//!
//! # Design Decisions
//! - No pooling: each request owns its upstream connection
//! - Body is never buffered; dropping the inbound response drops the upstream
//! - CORS headers are stamped by router layers, so every path carries them

pub mod error;
pub mod handler;
pub mod server;
pub mod transport;

pub use error::RelayError;
pub use server::RelayServer;
pub use transport::{Transport, Upstream};
