//! Origin fetcher.
//!
//! # Responsibilities
//! - Issue the outbound GET for the target URL over a shared streaming client
//! - Forward only the allow-listed inbound headers, plus the proxy identity
//!   (`user-agent`, `via` provenance marker, `x-forwarded-for`)
//! - Classify the outcome: usable stream, origin redirect/error, transport
//!   failure
//!
//! The response body is never buffered here; callers receive a byte stream
//! and are responsible for consuming or dropping it on every exit path.

use axum::http::header;
use bytes::Bytes;
use futures_util::Stream;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

use crate::config::FetchConfig;
use crate::error::ProxyError;
use crate::proxy::loopback::PROXY_VIA;

/// Inbound request headers forwarded to the origin, and nothing else.
const FORWARDED_REQUEST_HEADERS: &[header::HeaderName] = &[
    header::COOKIE,
    header::DNT,
    header::REFERER,
    header::RANGE,
];

/// User-agent presented to origins.
const PROXY_USER_AGENT: &str = "Bandwidth-Hero Compressor";

/// What the origin gave us, minus the body bytes themselves.
///
/// Owned exclusively by the handling request. Consuming the stream (or
/// dropping the whole descriptor) closes the origin connection.
pub struct OriginResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Declared content type, empty string when the origin sent none.
    pub content_type: String,
    /// Declared content length; 0 means unknown or empty.
    pub content_length: u64,
    response: reqwest::Response,
}

impl OriginResponse {
    /// Consume the descriptor into its body stream.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, reqwest::Error>> + Unpin {
        self.response.bytes_stream()
    }
}

/// Streaming HTTP client for origin fetches.
#[derive(Clone)]
pub struct OriginFetcher {
    client: Client,
}

impl OriginFetcher {
    /// Build the shared client with the configured redirect bound and
    /// timeout. Called once at startup.
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(Policy::limited(config.max_redirects))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    /// Fetch the target URL, forwarding the allow-listed inbound headers.
    ///
    /// A status of 400 or above, or a 3xx that still carries a `location`
    /// after the redirect budget, is reported as [`ProxyError::Origin`] so
    /// the caller can fall back to a client-side redirect instead of
    /// relaying a broken body.
    pub async fn fetch(
        &self,
        target: &Url,
        inbound: &HeaderMap,
        client_ip: &str,
    ) -> Result<OriginResponse, ProxyError> {
        let mut headers = HeaderMap::new();
        for name in FORWARDED_REQUEST_HEADERS {
            for value in inbound.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }
        headers.insert(header::USER_AGENT, HeaderValue::from_static(PROXY_USER_AGENT));
        headers.insert(header::VIA, HeaderValue::from_static(PROXY_VIA));
        let forwarded_for = inbound
            .get("x-forwarded-for")
            .cloned()
            .or_else(|| HeaderValue::from_str(client_ip).ok());
        if let Some(value) = forwarded_for {
            headers.insert("x-forwarded-for", value);
        }

        let response = self
            .client
            .get(target.clone())
            .headers(headers)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if status.as_u16() >= 400
            || (status.is_redirection() && response.headers().contains_key(header::LOCATION))
        {
            return Err(ProxyError::Origin {
                status: status.as_u16(),
            });
        }

        let response_headers = response.headers().clone();
        let content_type = response_headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        // Mandatory integer parse; missing or garbage lengths count as 0 so
        // the policy treats them as unknown.
        let content_length = response_headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        Ok(OriginResponse {
            status,
            headers: response_headers,
            content_type,
            content_length,
            response,
        })
    }
}

fn classify_send_error(error: reqwest::Error) -> ProxyError {
    if error.is_builder() {
        ProxyError::InvalidUrl
    } else {
        ProxyError::Transport(error)
    }
}
