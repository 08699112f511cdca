//! Bandwidth-saving HTTP image proxy.
//!
//! Given a target image URL, the proxy fetches it, decides whether
//! recompressing would meaningfully cut transferred bytes, and either
//! serves a lower-quality (optionally grayscale) JPEG or streams the
//! original bytes through untouched.

pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod observability;
pub mod proxy;
pub mod transcode;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use http::{shutdown_signal, HttpServer};
