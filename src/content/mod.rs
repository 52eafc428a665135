//! Mock content subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → /__mock/state, /__mock/set  (handlers.rs ↔ state.rs)
//!     → /favicon.ico                (404)
//!     → anything else:
//!         files.rs (normalise, read)
//!         → rewrite.rs (designated document only, driven by state.rs)
//!         → mime.rs (content type)
//!         → no-cache response
//! ```
//!
//! # Design Decisions
//! - The state cell is injected, never global
//! - Rewrite failures degrade to the on-disk bytes
//! - Every other document is served byte-for-byte

pub mod files;
pub mod handlers;
pub mod mime;
pub mod rewrite;
pub mod server;
pub mod state;

pub use rewrite::RewriteContext;
pub use server::ContentServer;
pub use state::{RegistrationState, StateCell};
