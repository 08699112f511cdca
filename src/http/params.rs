//! Query-string parsing for the proxy endpoint.
//!
//! # Query parameters
//! - `url`  - required target; its absence means the caller just wants the
//!   identification string.
//! - `jpeg` - present when the client cannot take webp-class output.
//! - `bw`   - grayscale switch; only the literal value `0` disables it.
//! - `l`    - JPEG quality 1-100; non-numeric or missing falls back to the
//!   configured default, out-of-range values are clamped.

use std::collections::HashMap;

/// Parsed, validated request options. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    /// Decoded target URL.
    pub url: String,
    /// Whether the client accepts the compact (webp-class) output.
    pub want_webp: bool,
    /// Whether to convert the image to grayscale.
    pub grayscale: bool,
    /// JPEG quality, 1-100.
    pub quality: u8,
}

impl RequestParams {
    /// Build params from the raw query map. Returns `None` when `url` is
    /// absent, which the handler answers with the identification string.
    pub fn from_query(query: &HashMap<String, String>, default_quality: u8) -> Option<Self> {
        let url = query.get("url")?.clone();
        if url.is_empty() {
            return None;
        }

        let want_webp = !query.contains_key("jpeg");
        let grayscale = query.get("bw").map(|v| v != "0").unwrap_or(true);
        let quality = query
            .get("l")
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|q| *q > 0)
            .map(|q| q.clamp(1, 100) as u8)
            .unwrap_or(default_quality);

        Some(Self {
            url,
            want_webp,
            grayscale,
            quality,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn missing_url_yields_none() {
        assert_eq!(RequestParams::from_query(&query(&[]), 40), None);
        assert_eq!(RequestParams::from_query(&query(&[("url", "")]), 40), None);
    }

    #[test]
    fn defaults_are_webp_grayscale_and_configured_quality() {
        let params = RequestParams::from_query(&query(&[("url", "http://a/b.png")]), 40).unwrap();
        assert!(params.want_webp);
        assert!(params.grayscale);
        assert_eq!(params.quality, 40);
    }

    #[test]
    fn jpeg_flag_disables_webp() {
        let params =
            RequestParams::from_query(&query(&[("url", "http://a/b.png"), ("jpeg", "")]), 40)
                .unwrap();
        assert!(!params.want_webp);
        // Any value works; presence is what matters.
        let params =
            RequestParams::from_query(&query(&[("url", "http://a/b.png"), ("jpeg", "1")]), 40)
                .unwrap();
        assert!(!params.want_webp);
    }

    #[test]
    fn bw_zero_is_the_only_color_opt_out() {
        let params =
            RequestParams::from_query(&query(&[("url", "http://a/b.png"), ("bw", "0")]), 40)
                .unwrap();
        assert!(!params.grayscale);

        let params =
            RequestParams::from_query(&query(&[("url", "http://a/b.png"), ("bw", "1")]), 40)
                .unwrap();
        assert!(params.grayscale);
    }

    #[test]
    fn quality_parses_clamps_and_defaults() {
        let q = |l: &str| {
            RequestParams::from_query(&query(&[("url", "http://a/b.png"), ("l", l)]), 40)
                .unwrap()
                .quality
        };
        assert_eq!(q("75"), 75);
        assert_eq!(q("150"), 100);
        assert_eq!(q("0"), 40);
        assert_eq!(q("-5"), 40);
        assert_eq!(q("abc"), 40);
    }
}
