//! HTTP protocol handling subsystem (collector side).
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID + trace layers)
//!     → request.rs (request ID, payload parsing)
//!     → collector (outcome draw, sample append)
//!     → "OK" / empty 500 / nothing
//! ```

pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::CollectorServer;
