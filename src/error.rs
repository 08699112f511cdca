//! Request-path error taxonomy.
//!
//! Every failure in the proxy pipeline collapses into one of these variants
//! at the request boundary. Only `InvalidUrl` is shown to the client (as a
//! 400); everything else resolves to a 302 redirect to the original URL so
//! the client can fetch it directly. Nothing is retried.

use thiserror::Error;

/// Errors produced by the fetch/policy/transcode pipeline.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The target URL could not be parsed or is not http(s).
    #[error("invalid target url")]
    InvalidUrl,

    /// The origin answered with an error status or an unresolvable redirect.
    #[error("origin returned status {status}")]
    Origin { status: u16 },

    /// Transport-level failure talking to the origin (DNS, reset, timeout).
    #[error("origin transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    /// Reading the origin body stream failed mid-flight.
    #[error("origin body read failed: {0}")]
    BodyRead(#[source] reqwest::Error),

    /// The image codec rejected the input or failed while re-encoding.
    #[error("image transcode failed: {0}")]
    Transform(#[from] image::ImageError),

    /// The blocking transcode task was cancelled or panicked.
    #[error("transcode task failed: {0}")]
    TranscodeTask(#[from] tokio::task::JoinError),
}
