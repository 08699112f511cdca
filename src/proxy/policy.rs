//! Compression policy.
//!
//! Pure decision function: given what the origin declared about the
//! resource and what the client asked for, decide whether re-encoding is
//! worth it. No I/O, no hidden state.

/// Smallest image worth re-encoding for webp-capable clients.
pub const MIN_COMPRESS_LENGTH: u64 = 1024;

/// Threshold for converting lossless PNG/GIF to JPEG for clients that only
/// accept JPEG. Re-encoding a small lossless image as lossy JPEG is a net
/// loss well past the point where a small JPEG stops being worth the CPU,
/// hence the 100x larger bound.
pub const MIN_TRANSPARENT_COMPRESS_LENGTH: u64 = MIN_COMPRESS_LENGTH * 100;

/// Decide whether the origin resource should be re-encoded.
///
/// `origin_size` is the declared content length, with 0 meaning unknown or
/// empty. Rules are evaluated in order; the first rule that declines wins.
pub fn should_compress(
    origin_type: &str,
    origin_size: u64,
    has_range: bool,
    want_webp: bool,
) -> bool {
    if !origin_type.starts_with("image") {
        return false;
    }
    if origin_size == 0 {
        return false;
    }
    // Range semantics cannot be preserved across re-encoding.
    if has_range {
        return false;
    }
    if want_webp && origin_size < MIN_COMPRESS_LENGTH {
        return false;
    }
    if !want_webp
        && (origin_type.ends_with("png") || origin_type.ends_with("gif"))
        && origin_size < MIN_TRANSPARENT_COMPRESS_LENGTH
    {
        return false;
    }

    true
}
