//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, handler)
//!     → request.rs (request ID)
//!     → [load balancer picks backend]
//!     → forward.rs (rewrite, send via client.rs, meter response body)
//!     → response.rs (header copy, lb-from)
//!     → Send to client
//! ```

pub mod client;
pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{ForwardError, ForwardSettings, Forwarder};
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::LB_FROM;
pub use server::{HttpServer, NO_BACKEND_BODY, ServerError};
