//! Fluent load API and request orchestration

use crate::cache::ImageCache;
use crate::decode::decode_to_fit;
use crate::error::Result;
use crate::fetch::{Fetch, HttpFetcher};
use crate::scheduler::Scheduler;
use crate::types::{BitmapTarget, CachePolicy, DecodeTarget};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Per-request completion callback. `Ok` fires on the UI lane after the
/// bitmap has been handed to the target; `Err` fires from the background
/// lane when the load was abandoned.
pub type ResultCallback = Box<dyn FnOnce(Result<()>) + Send + 'static>;

/// Entry point: owns the cache directory and the host's collaborators.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use image_loader::{ImageLoader, TokioScheduler};
/// # fn demo(target: Arc<dyn image_loader::BitmapTarget>) {
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # let _guard = rt.enter();
/// let (scheduler, ui_lane) = TokioScheduler::new();
/// tokio::spawn(ui_lane.run());
/// let loader = ImageLoader::with("/data/app/cache", scheduler);
///
/// loader
///     .load("https://example.com/photo.jpg")
///     .valid_cache_days(7)
///     .into_target(target);
/// # }
/// ```
pub struct ImageLoader {
    cache: ImageCache,
    scheduler: Arc<dyn Scheduler>,
    fetcher: Arc<dyn Fetch>,
}

impl ImageLoader {
    /// Create a loader over the host's private cache directory, fetching
    /// with the default HTTP transport.
    pub fn with(cache_dir: impl Into<PathBuf>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self::with_fetcher(cache_dir, scheduler, Arc::new(HttpFetcher::new()))
    }

    /// Create a loader with an injected transport.
    pub fn with_fetcher(
        cache_dir: impl Into<PathBuf>,
        scheduler: Arc<dyn Scheduler>,
        fetcher: Arc<dyn Fetch>,
    ) -> Self {
        Self {
            cache: ImageCache::new(cache_dir),
            scheduler,
            fetcher,
        }
    }

    /// Begin a load request for `url`. Caching is enabled with no age limit
    /// until the request says otherwise.
    pub fn load(&self, url: impl Into<String>) -> LoadRequest<'_> {
        LoadRequest {
            loader: self,
            url: url.into(),
            policy: CachePolicy::default(),
            on_result: None,
        }
    }

    /// Best-effort removal of every cached image. See [`ImageCache::clear`].
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// One configured load, consumed by [`LoadRequest::into_target`].
pub struct LoadRequest<'a> {
    loader: &'a ImageLoader,
    url: String,
    policy: CachePolicy,
    on_result: Option<ResultCallback>,
}

impl LoadRequest<'_> {
    /// Skip the disk cache entirely: always fetch, never write.
    pub fn disable_cache(mut self) -> Self {
        self.policy.enabled = false;
        self
    }

    /// Re-fetch cached files older than `days` whole days. A file exactly
    /// `days` old is still served from cache.
    pub fn valid_cache_days(mut self, days: i64) -> Self {
        self.policy.max_age_days = Some(days);
        self
    }

    /// Observe the outcome of this load. Without a callback the request is
    /// fire-and-forget: failures are logged and the target simply never
    /// updates.
    pub fn on_result(mut self, callback: impl FnOnce(Result<()>) + Send + 'static) -> Self {
        self.on_result = Some(Box::new(callback));
        self
    }

    /// Dispatch the load and deliver the decoded bitmap to `target`.
    ///
    /// The target's bounding box is read here, before the request leaves the
    /// caller's thread. Fetch and decode then run as one background unit of
    /// work; on success a single UI task hands the bitmap over. A failure at
    /// any step abandons the load with no partial update and no retry.
    pub fn into_target(self, target: Arc<dyn BitmapTarget>) {
        let bounds = DecodeTarget {
            width: target.width(),
            height: target.height(),
        };

        // Everything the background task needs is owned from here on; the
        // builder itself never crosses the thread boundary.
        let job = LoadJob {
            url: self.url,
            policy: self.policy,
            bounds,
            target,
            cache: self.loader.cache.clone(),
            fetcher: Arc::clone(&self.loader.fetcher),
            scheduler: Arc::clone(&self.loader.scheduler),
            on_result: self.on_result,
        };

        self.loader
            .scheduler
            .run_background(Box::new(move || job.run()));
    }
}

/// Owned snapshot of one dispatched request.
struct LoadJob {
    url: String,
    policy: CachePolicy,
    bounds: DecodeTarget,
    target: Arc<dyn BitmapTarget>,
    cache: ImageCache,
    fetcher: Arc<dyn Fetch>,
    scheduler: Arc<dyn Scheduler>,
    on_result: Option<ResultCallback>,
}

impl LoadJob {
    fn run(self) {
        let outcome = self.fetch_and_decode();

        match outcome {
            Ok(bitmap) => {
                let target = self.target;
                let on_result = self.on_result;
                self.scheduler.run_on_ui(Box::new(move || {
                    target.set_bitmap(bitmap);
                    if let Some(callback) = on_result {
                        callback(Ok(()));
                    }
                }));
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "image load failed");
                if let Some(callback) = self.on_result {
                    callback(Err(e));
                }
            }
        }
    }

    fn fetch_and_decode(&self) -> Result<image::DynamicImage> {
        let bytes = if self.policy.enabled {
            let path = self
                .cache
                .resolve(&self.url, &self.policy, self.fetcher.as_ref())?;
            fs::read(path)?
        } else {
            self.fetcher.fetch(&self.url)?
        };

        decode_to_fit(&bytes, self.bounds)
    }
}
