//! Remote image loading with a time-expiring disk cache
//!
//! Fetches an image over HTTP(S), optionally caches the raw bytes under a
//! `cached_images/` directory keyed by URL fingerprint, decodes and
//! aspect-fits the bitmap to a destination widget's bounding box, and hands
//! the result to the widget on a UI-affine scheduling lane. All fetch and
//! decode work runs off the UI thread.
//!
//! # Example
//!
//! ```no_run
//! use image_loader::{ImageLoader, TokioScheduler};
//! use std::sync::Arc;
//!
//! # fn demo(image_view: Arc<dyn image_loader::BitmapTarget>) {
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # let _guard = rt.enter();
//! let (scheduler, ui_lane) = TokioScheduler::new();
//! // The host pumps bitmap deliveries from its main loop.
//! tokio::spawn(ui_lane.run());
//!
//! let loader = ImageLoader::with("/data/app/cache", scheduler);
//!
//! // Serve from cache while the file is at most a week old.
//! loader
//!     .load("https://example.com/photo.jpg")
//!     .valid_cache_days(7)
//!     .into_target(Arc::clone(&image_view));
//!
//! // Bypass the cache entirely.
//! loader
//!     .load("https://example.com/live.jpg")
//!     .disable_cache()
//!     .into_target(image_view);
//! # }
//! ```
//!
//! There is no retry, no cancellation, and no cross-request ordering: each
//! dispatched load runs to completion or is abandoned on its first error.
//! Without an [`LoadRequest::on_result`] callback, failures are only logged
//! and the widget simply never updates.

mod cache;
mod decode;
mod error;
mod fetch;
mod loader;
mod scheduler;
mod types;

pub use cache::ImageCache;
pub use decode::decode_to_fit;
pub use error::{LoadError, Result};
pub use fetch::{Fetch, HttpFetcher};
pub use loader::{ImageLoader, LoadRequest, ResultCallback};
pub use scheduler::{Scheduler, Task, TokioScheduler, UiLane};
pub use types::{BitmapTarget, CachePolicy, DecodeTarget};
