//! ps-thumb: thumbnail generation.
//!
//! Turns raw PNG, JPEG or GIF bytes into a small PNG that fits inside a
//! bounding box. The input format is detected from the content, never from a
//! file name, and the output is always PNG so consumers have a single decode
//! path.

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use ps_core::{Error, Result};

/// Default thumbnail bounding box width in pixels.
pub const DEFAULT_WIDTH: u32 = 100;

/// Default thumbnail bounding box height in pixels.
pub const DEFAULT_HEIGHT: u32 = 100;

/// Input encodings accepted by [`resize`].
pub const SUPPORTED_FORMATS: &[ImageFormat] =
    &[ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Gif];

/// MIME type of every generated thumbnail.
pub const THUMBNAIL_MIME: &str = "image/png";

/// Produces thumbnails from raw image bytes.
pub trait Thumbnailer: Send + Sync {
    /// Shrink `data` to fit within `width` x `height` and re-encode it.
    fn thumbnail(&self, data: &[u8], width: u32, height: u32) -> Result<Vec<u8>>;
}

/// The production [`Thumbnailer`]: nearest-neighbor shrink, PNG output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngThumbnailer;

impl Thumbnailer for PngThumbnailer {
    fn thumbnail(&self, data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
        resize(data, width, height)
    }
}

/// Detect a supported image format from the leading bytes of `data`.
///
/// Returns `None` for unknown content and for formats outside
/// [`SUPPORTED_FORMATS`].
pub fn sniff_format(data: &[u8]) -> Option<ImageFormat> {
    image::guess_format(data)
        .ok()
        .filter(|format| SUPPORTED_FORMATS.contains(format))
}

/// Build a PNG thumbnail of `data` that fits within `width` x `height`.
///
/// The aspect ratio is preserved and images already inside the box keep their
/// size.
///
/// # Errors
///
/// * [`Error::Validation`] if either target dimension is zero
/// * [`Error::Decode`] if `data` is not a decodable PNG, JPEG or GIF
/// * [`Error::Encode`] if the PNG encoder fails
pub fn resize(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(Error::Validation(format!(
            "thumbnail size {width}x{height} has a zero dimension"
        )));
    }

    let format = sniff_format(data).ok_or_else(|| {
        Error::Decode("unrecognized or unsupported image format".to_string())
    })?;

    let img = image::load_from_memory_with_format(data, format)
        .map_err(|e| Error::Decode(format!("failed to decode {format:?} image: {e}")))?;

    let thumb = shrink_to_fit(img, width, height);

    let mut buf = Cursor::new(Vec::new());
    thumb
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| Error::Encode(format!("failed to encode PNG thumbnail: {e}")))?;

    tracing::debug!(
        ?format,
        width = thumb.width(),
        height = thumb.height(),
        "Generated thumbnail"
    );

    Ok(buf.into_inner())
}

fn shrink_to_fit(img: DynamicImage, width: u32, height: u32) -> DynamicImage {
    if img.width() <= width && img.height() <= height {
        return img;
    }
    img.resize(width, height, FilterType::Nearest)
}
