//! Proxy pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → handler.rs (parse params, orchestrate)
//!     → loopback.rs (self-call guard, before any I/O)
//!     → fetch (origin stream)
//!     → policy.rs (compress / bypass decision)
//!     → transcode or direct stream copy
//!     → client
//! ```

pub mod handler;
pub mod loopback;
pub mod policy;

pub use handler::{favicon_handler, proxy_handler, IDENTIFICATION};
pub use policy::should_compress;
