//! Core types for the image loader

use image::DynamicImage;

/// Per-request cache behavior, fixed for the lifetime of one load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    /// When false, every load fetches from the network and never touches disk.
    pub enabled: bool,
    /// Maximum whole-day age of a cached file before it is re-fetched.
    /// `None` means cached forever, never expired by age.
    pub max_age_days: Option<i64>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age_days: None,
        }
    }
}

/// Bounding box of the destination widget, captured when the request is
/// dispatched. The decoder fits the longer source edge to
/// `max(width, height)` while preserving aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeTarget {
    pub width: u32,
    pub height: u32,
}

impl DecodeTarget {
    /// The long-edge target size used by the aspect-fit resize.
    pub fn max_size(&self) -> u32 {
        self.width.max(self.height)
    }
}

/// The GUI-widget collaborator that receives the decoded bitmap.
///
/// `set_bitmap` is only ever invoked on the UI scheduling lane; `width` and
/// `height` are read once, before the request leaves the caller's thread.
pub trait BitmapTarget: Send + Sync {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn set_bitmap(&self, bitmap: DynamicImage);
}
