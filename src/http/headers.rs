//! Header projection between origin responses and outbound responses.
//!
//! The header contract is expressed as static tables per response mode
//! (passthrough / bypass / redirect) rather than imperative branching, so
//! it can be audited and tested without any I/O.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Response, StatusCode};
use tracing::warn;

/// Marker set on responses where the policy declined to compress.
pub const X_PROXY_BYPASS: &str = "x-proxy-bypass";
/// Declared size of the origin resource, echoed on compressed responses.
pub const X_ORIGINAL_SIZE: &str = "x-original-size";
/// Original size minus final size; negative when the image grew.
pub const X_BYTES_SAVED: &str = "x-bytes-saved";

/// Hop-by-hop headers never replayed from the origin; the server layer
/// manages its own framing.
const HOP_BY_HOP: &[HeaderName] = &[
    header::TRANSFER_ENCODING,
    header::CONNECTION,
    header::TRAILER,
    header::UPGRADE,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
];

/// Headers stripped from redirect responses: they describe the failed fetch
/// attempt, and caching them against the redirect target would be wrong.
const REDIRECT_STRIPPED: &[HeaderName] = &[
    header::CACHE_CONTROL,
    header::EXPIRES,
    header::DATE,
    header::ETAG,
];

/// Origin headers forwarded verbatim in bypass mode.
const BYPASS_FORWARDED: &[HeaderName] = &[
    header::ACCEPT_RANGES,
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::CONTENT_RANGE,
];

/// Copy every origin header into the outbound map, individually, so one bad
/// header never takes the rest down with it.
pub fn copy_origin_headers(origin: &HeaderMap, out: &mut HeaderMap) {
    for (name, value) in origin {
        if HOP_BY_HOP.contains(name) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
}

/// Overrides applied after the origin copy on every body-bearing response.
pub fn apply_passthrough_overrides(out: &mut HeaderMap) {
    out.insert(header::CONTENT_ENCODING, HeaderValue::from_static("identity"));
    out.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    out.insert(
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("cross-origin"),
    );
    out.insert(
        HeaderName::from_static("cross-origin-embedder-policy"),
        HeaderValue::from_static("unsafe-none"),
    );
}

/// Re-assert the allow-listed origin headers on top of the passthrough
/// copy, and mark the response so the skipped compression is observable.
pub fn apply_bypass_headers(origin: &HeaderMap, out: &mut HeaderMap) {
    for name in BYPASS_FORWARDED {
        if let Some(value) = origin.get(name) {
            out.insert(name.clone(), value.clone());
        }
    }
    out.insert(
        HeaderName::from_static(X_PROXY_BYPASS),
        HeaderValue::from_static("1"),
    );
}

/// Remove every header in the redirect strip table.
pub fn strip_redirect_headers(out: &mut HeaderMap) {
    for name in REDIRECT_STRIPPED {
        out.remove(name);
    }
}

/// Build the 302 fallback response pointing the client at the original URL.
///
/// `target_url` must already be percent-encoded (the parsed `url::Url`
/// serialization is). The body is always empty.
pub fn redirect_response(target_url: &str) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::FOUND;

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
    match HeaderValue::from_str(target_url) {
        Ok(value) => {
            headers.insert(header::LOCATION, value);
        }
        Err(error) => {
            // Can only happen for URLs that were never parseable anyway.
            warn!(%error, url = %target_url, "location header rejected");
        }
    }
    strip_redirect_headers(response.headers_mut());

    response
}

/// Insert a header built from a string value, logging and skipping on an
/// invalid byte sequence instead of failing the request.
pub fn set_header(out: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            out.insert(name, v);
        }
        Err(error) => {
            warn!(%error, header = %name, "skipping unrepresentable header");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_carries_location_and_empty_length_only() {
        let response = redirect_response("http://example.com/a%20b.png");
        assert_eq!(response.status(), StatusCode::FOUND);
        let headers = response.headers();
        assert_eq!(headers.get(header::CONTENT_LENGTH).unwrap(), "0");
        assert_eq!(
            headers.get(header::LOCATION).unwrap(),
            "http://example.com/a%20b.png"
        );
        for name in REDIRECT_STRIPPED {
            assert!(headers.get(name).is_none(), "{name} must be stripped");
        }
    }

    #[test]
    fn strip_table_removes_cache_headers() {
        let mut map = HeaderMap::new();
        map.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=60"));
        map.insert(header::ETAG, HeaderValue::from_static("\"abc\""));
        map.insert(header::EXPIRES, HeaderValue::from_static("0"));
        map.insert(header::DATE, HeaderValue::from_static("now"));
        map.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));

        strip_redirect_headers(&mut map);

        assert!(map.get(header::CACHE_CONTROL).is_none());
        assert!(map.get(header::ETAG).is_none());
        assert!(map.get(header::EXPIRES).is_none());
        assert!(map.get(header::DATE).is_none());
        assert_eq!(map.get(header::CONTENT_TYPE).unwrap(), "image/png");
    }

    #[test]
    fn origin_copy_skips_hop_by_hop() {
        let mut origin = HeaderMap::new();
        origin.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        origin.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        origin.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/gif"));
        origin.append("x-custom", HeaderValue::from_static("a"));
        origin.append("x-custom", HeaderValue::from_static("b"));

        let mut out = HeaderMap::new();
        copy_origin_headers(&origin, &mut out);

        assert!(out.get(header::TRANSFER_ENCODING).is_none());
        assert!(out.get(header::CONNECTION).is_none());
        assert_eq!(out.get(header::CONTENT_TYPE).unwrap(), "image/gif");
        assert_eq!(out.get_all("x-custom").iter().count(), 2);
    }

    #[test]
    fn passthrough_overrides_force_identity_and_cors() {
        let mut out = HeaderMap::new();
        out.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));

        apply_passthrough_overrides(&mut out);

        assert_eq!(out.get(header::CONTENT_ENCODING).unwrap(), "identity");
        assert_eq!(out.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert_eq!(
            out.get("cross-origin-resource-policy").unwrap(),
            "cross-origin"
        );
        assert_eq!(
            out.get("cross-origin-embedder-policy").unwrap(),
            "unsafe-none"
        );
    }

    #[test]
    fn bypass_forwards_allow_list_and_marks_response() {
        let mut origin = HeaderMap::new();
        origin.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
        origin.insert(header::CONTENT_LENGTH, HeaderValue::from_static("500"));
        origin.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        origin.insert(header::SERVER, HeaderValue::from_static("origin/1.0"));

        let mut out = HeaderMap::new();
        apply_bypass_headers(&origin, &mut out);

        assert_eq!(out.get(header::CONTENT_TYPE).unwrap(), "image/png");
        assert_eq!(out.get(header::CONTENT_LENGTH).unwrap(), "500");
        assert_eq!(out.get(header::ACCEPT_RANGES).unwrap(), "bytes");
        assert_eq!(out.get(X_PROXY_BYPASS).unwrap(), "1");
        // The allow-list itself never pulls anything else in.
        assert!(out.get(header::SERVER).is_none());
    }

    #[test]
    fn set_header_skips_invalid_values() {
        let mut out = HeaderMap::new();
        set_header(&mut out, HeaderName::from_static("x-test"), "ok");
        set_header(&mut out, HeaderName::from_static("x-bad"), "line\nbreak");
        assert_eq!(out.get("x-test").unwrap(), "ok");
        assert!(out.get("x-bad").is_none());
    }
}
