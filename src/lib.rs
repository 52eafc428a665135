//! Registration page monitoring helpers.
//!
//! Two independently deployed HTTP components:
//!
//! - [`relay`]: a CORS-opening forwarding proxy (`?url=<absolute-url>`)
//!   that streams the upstream response back to the browser.
//! - [`content`]: a static file server with an in-memory mock
//!   registration state that rewrites one designated document.

pub mod config;
pub mod content;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;

pub use config::AppConfig;
pub use content::{ContentServer, RegistrationState, StateCell};
pub use lifecycle::Shutdown;
pub use relay::RelayServer;
