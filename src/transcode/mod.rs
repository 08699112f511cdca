//! Image transcode pipeline.
//!
//! # Data Flow
//! ```text
//! origin byte stream
//!     → gather (chunk by chunk; dropped on client disconnect)
//!     → blocking worker: decode → cap height → optional grayscale
//!     → JPEG encode at requested quality
//!     → TranscodeOutput { body, sizes }
//! ```
//!
//! # Design Decisions
//! - Decode needs the full input, so the pipeline owns the bytes; the
//!   fetcher itself never buffers
//! - Pixel work runs on `spawn_blocking` to keep the request task
//!   non-blocking
//! - The encoder emits no chroma subsampling (full 4:4:4 fidelity)
//! - Alpha is flattened before encoding; JPEG has no transparency
//! - Smaller images are never enlarged

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::ProxyError;

/// Per-request transform options, fixed for the whole invocation.
#[derive(Debug, Clone, Copy)]
pub struct TranscodeOptions {
    /// JPEG quality, 1-100.
    pub quality: u8,
    /// Convert to grayscale before encoding.
    pub grayscale: bool,
    /// Maximum output height; taller inputs are scaled down to fit.
    pub max_height: u32,
}

/// Result of a finished transcode. The sizes are known before any body
/// byte leaves the process, which is what lets the handler commit
/// `content-length` and the savings headers ahead of the body.
#[derive(Debug)]
pub struct TranscodeOutput {
    /// Encoded JPEG bytes.
    pub body: Vec<u8>,
    /// Size the origin declared for the source image.
    pub original_size: u64,
    /// Encoded output size.
    pub final_size: u64,
}

impl TranscodeOutput {
    /// Original size minus final size; negative when the image grew.
    pub fn bytes_saved(&self) -> i64 {
        self.original_size as i64 - self.final_size as i64
    }
}

/// Run the origin stream through decode/resize/grayscale/JPEG-encode.
///
/// `declared_size` is the origin's content length, echoed into the output
/// metadata. Any decode or encode failure surfaces as
/// [`ProxyError::Transform`] so the handler can fall back to a redirect;
/// at that point nothing has been written to the client yet.
pub async fn transcode<S>(
    declared_size: u64,
    mut stream: S,
    options: TranscodeOptions,
) -> Result<TranscodeOutput, ProxyError>
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Unpin,
{
    let mut input = Vec::with_capacity(declared_size.min(8 * 1024 * 1024) as usize);
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ProxyError::BodyRead)?;
        input.extend_from_slice(&chunk);
    }

    let body = tokio::task::spawn_blocking(move || encode_jpeg(&input, options)).await??;

    let final_size = body.len() as u64;
    Ok(TranscodeOutput {
        body,
        original_size: declared_size,
        final_size,
    })
}

fn encode_jpeg(input: &[u8], options: TranscodeOptions) -> Result<Vec<u8>, image::ImageError> {
    let mut image = image::load_from_memory(input)?;

    if image.height() > options.max_height {
        // Width follows the aspect ratio; only the height is capped.
        image = image.resize(u32::MAX, options.max_height, FilterType::Lanczos3);
    }

    // JPEG cannot carry alpha, and the encoder rejects RGBA input outright.
    let image = if options.grayscale {
        DynamicImage::ImageLuma8(image.to_luma8())
    } else {
        DynamicImage::ImageRgb8(image.to_rgb8())
    };

    let mut output = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut output, options.quality);
    image.write_with_encoder(encoder)?;
    Ok(output)
}
