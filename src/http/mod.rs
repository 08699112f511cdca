//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → params.rs (query string → RequestParams)
//!     → [proxy pipeline decides compress / bypass / redirect]
//!     → headers.rs (project origin headers per response mode)
//!     → Send to client
//! ```

pub mod headers;
pub mod params;
pub mod server;

pub use params::RequestParams;
pub use server::{shutdown_signal, AppState, HttpServer};
