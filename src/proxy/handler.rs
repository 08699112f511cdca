//! Request orchestration.
//!
//! Control flow per request:
//! params → loopback guard → origin fetch → compression policy →
//! (transcode | bypass stream) → client. Exactly one response is produced
//! on every path, and headers are only assembled before the response value
//! exists; nothing mutates them after.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{header, HeaderMap, HeaderName, Response, StatusCode};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::ProxyError;
use crate::http::headers::{
    apply_bypass_headers, apply_passthrough_overrides, copy_origin_headers, redirect_response,
    set_header, X_BYTES_SAVED, X_ORIGINAL_SIZE,
};
use crate::http::params::RequestParams;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::{loopback, policy};
use crate::transcode::{self, TranscodeOptions};

/// Body served when no `url` parameter is given, so clients can probe that
/// they are talking to this proxy.
pub const IDENTIFICATION: &str = "bandwidth-hero-proxy";

/// The proxy endpoint.
pub async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(query): Query<HashMap<String, String>>,
    inbound: HeaderMap,
) -> Response<Body> {
    let default_quality = state.config.transcode.default_quality;
    let Some(params) = RequestParams::from_query(&query, default_quality) else {
        metrics::record_request("identification");
        return plain_response(StatusCode::OK, IDENTIFICATION);
    };

    // Parsing doubles as validation; the serialized form is the
    // percent-encoded URL used for redirects and the outbound fetch.
    let target = match Url::parse(&params.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        _ => {
            debug!(url = %params.url, "rejecting unparseable target");
            metrics::record_request("invalid_url");
            return plain_response(StatusCode::BAD_REQUEST, "Invalid URL");
        }
    };

    let client_ip = peer.ip().to_string();
    if loopback::is_self_request(&inbound, &client_ip) {
        warn!(url = %target, "loopback detected, redirecting without fetch");
        metrics::record_request("loopback");
        return redirect_response(target.as_str());
    }

    let origin = match state.fetcher.fetch(&target, &inbound, &client_ip).await {
        Ok(origin) => origin,
        Err(ProxyError::InvalidUrl) => {
            metrics::record_request("invalid_url");
            return plain_response(StatusCode::BAD_REQUEST, "Invalid URL");
        }
        Err(ProxyError::Origin { status }) => {
            debug!(url = %target, status, "origin unusable, redirecting client");
            metrics::record_request("origin_redirect");
            return redirect_response(target.as_str());
        }
        Err(error) => {
            error!(url = %target, %error, "origin fetch failed");
            metrics::record_request("fetch_error");
            return redirect_response(target.as_str());
        }
    };

    let mut out_headers = HeaderMap::new();
    copy_origin_headers(&origin.headers, &mut out_headers);
    apply_passthrough_overrides(&mut out_headers);

    let compress = policy::should_compress(
        &origin.content_type,
        origin.content_length,
        inbound.contains_key(header::RANGE),
        params.want_webp,
    );

    if !compress {
        debug!(
            url = %target,
            content_type = %origin.content_type,
            size = origin.content_length,
            "policy declined, streaming origin bytes"
        );
        metrics::record_request("bypass");
        apply_bypass_headers(&origin.headers, &mut out_headers);
        return stream_response(out_headers, origin.into_stream());
    }

    let options = TranscodeOptions {
        quality: params.quality,
        grayscale: params.grayscale,
        max_height: state.config.transcode.max_height,
    };
    let declared_size = origin.content_length;

    match transcode::transcode(declared_size, origin.into_stream(), options).await {
        Ok(output) => {
            info!(
                url = %target,
                original_size = output.original_size,
                final_size = output.final_size,
                bytes_saved = output.bytes_saved(),
                quality = options.quality,
                grayscale = options.grayscale,
                "compressed"
            );
            metrics::record_request("compressed");
            metrics::record_bytes_saved(output.bytes_saved());

            // Result metadata is committed before any body byte leaves.
            out_headers.insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static("image/jpeg"),
            );
            set_header(
                &mut out_headers,
                header::CONTENT_LENGTH,
                &output.final_size.to_string(),
            );
            set_header(
                &mut out_headers,
                HeaderName::from_static(X_ORIGINAL_SIZE),
                &output.original_size.to_string(),
            );
            set_header(
                &mut out_headers,
                HeaderName::from_static(X_BYTES_SAVED),
                &output.bytes_saved().to_string(),
            );

            let mut response = Response::new(Body::from(output.body));
            *response.headers_mut() = out_headers;
            response
        }
        Err(error) => {
            // Nothing has been sent yet, so the redirect fallback is safe.
            error!(url = %target, %error, "transcode failed, redirecting client");
            metrics::record_request("transcode_error");
            redirect_response(target.as_str())
        }
    }
}

/// 204 for browsers probing `/favicon.ico`.
pub async fn favicon_handler() -> StatusCode {
    StatusCode::NO_CONTENT
}

fn plain_response(status: StatusCode, body: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

fn stream_response<S>(headers: HeaderMap, stream: S) -> Response<Body>
where
    S: futures_util::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
{
    // Backpressure-driven: the client's read pace gates how fast we pull
    // from the origin; a disconnect drops the stream and closes it.
    let mut response = Response::new(Body::from_stream(stream));
    *response.headers_mut() = headers;
    response
}
