//! Decode raw bytes into a bitmap sized for a destination widget

use crate::error::Result;
use crate::types::DecodeTarget;
use image::{imageops::FilterType, DynamicImage, ImageReader};
use std::io::Cursor;
use tracing::debug;

/// Decode `bytes` and aspect-fit the result to `target`.
///
/// The longer source edge is scaled relative to `max(target.width,
/// target.height)`: a landscape or square source gets height `max_size`, a
/// portrait source gets width `max_size`, the other edge follows the source
/// aspect ratio. A zero-sized target decodes at natural size.
///
/// Source dimensions come from a header probe, so the full pixel decode
/// happens once, already knowing the output size. Corrupt bytes yield a
/// decode error; a corrupt cached file is not evicted here and will keep
/// failing until it expires or the cache is cleared.
pub fn decode_to_fit(bytes: &[u8], target: DecodeTarget) -> Result<DynamicImage> {
    let (src_w, src_h) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .into_dimensions()?;

    let decoded = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .decode()?;

    let max_size = target.max_size();
    if max_size == 0 || src_w == 0 || src_h == 0 {
        return Ok(decoded);
    }

    let (desired_w, desired_h) = desired_dimensions(src_w, src_h, max_size);
    debug!(src_w, src_h, desired_w, desired_h, "decoded and resizing");

    Ok(decoded.resize_exact(desired_w, desired_h, FilterType::Triangle))
}

/// Output dimensions for the aspect-fit resize.
fn desired_dimensions(src_w: u32, src_h: u32, max_size: u32) -> (u32, u32) {
    let (src_w, src_h, max) = (src_w as u64, src_h as u64, max_size as u64);
    let (w, h) = if src_w >= src_h {
        (src_w * max / src_h, max)
    } else {
        (max, src_h * max / src_w)
    };
    (w as u32, h as u32)
}
