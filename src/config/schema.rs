//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so a missing or minimal config file still
//! produces a runnable server.

use serde::{Deserialize, Serialize};

/// Root configuration for the image proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Outbound origin-fetch settings.
    pub fetch: FetchConfig,

    /// Image transcode settings.
    pub transcode: TranscodeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Hard cap on handler time before the response starts, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_secs: 60,
        }
    }
}

/// Outbound fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// How many origin redirects to follow before giving up.
    pub max_redirects: usize,

    /// Total timeout for an origin request, in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_redirects: 4,
            timeout_secs: 30,
        }
    }
}

/// Image transcode configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranscodeConfig {
    /// JPEG quality used when the client does not ask for one (1-100).
    pub default_quality: u8,

    /// Output images taller than this are scaled down to fit; smaller
    /// images are never enlarged.
    pub max_height: u32,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            default_quality: 40,
            max_height: 16383,
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Whether to expose a Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Address for the metrics exporter to listen on.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
