//! HTTP plumbing shared by both components.
//!
//! # Data Flow
//! ```text
//! TCP connection (axum::serve)
//!     → request.rs (request ID, query decoding)
//!     → component router (relay or content)
//!     → headers.rs (CORS / cache header sets)
//!     → Send to client
//! ```

pub mod headers;
pub mod request;

pub use request::{request_id, QueryParams, UuidRequestId, X_REQUEST_ID};
