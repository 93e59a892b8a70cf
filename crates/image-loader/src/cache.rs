//! Disk cache for raw image bytes, keyed by URL fingerprint

use crate::error::Result;
use crate::fetch::Fetch;
use crate::types::CachePolicy;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the managed subdirectory under the host's private cache dir.
const CACHE_SUBDIR: &str = "cached_images";

/// Maps URLs to files under `<root>/cached_images/` and decides hit vs miss
/// by file presence and age alone. Content is never verified after the
/// initial write.
///
/// Concurrent resolves of the same URL may both fetch; each write is an
/// atomic whole-file replace, so the last writer wins and the file is always
/// one intact encoding.
#[derive(Debug, Clone)]
pub struct ImageCache {
    root: PathBuf,
}

impl ImageCache {
    /// Create a cache rooted at the host's private cache directory. Nothing
    /// is touched on disk until the first resolve.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The managed `cached_images/` directory.
    pub fn dir(&self) -> PathBuf {
        self.root.join(CACHE_SUBDIR)
    }

    /// Cache file path for a URL: fingerprint plus the URL's trailing
    /// extension.
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir().join(url_fingerprint::cache_file_name(url))
    }

    /// Return a path holding current bytes for `url`, fetching on miss.
    ///
    /// A hit requires the file to exist and to be no older (in whole days,
    /// truncated) than `policy.max_age_days`; `None` never expires. A miss,
    /// absent or expired, fetches and atomically replaces the file.
    pub fn resolve(&self, url: &str, policy: &CachePolicy, fetcher: &dyn Fetch) -> Result<PathBuf> {
        let dir = self.dir();
        fs::create_dir_all(&dir)?;

        let path = self.path_for(url);
        if is_fresh(&path, policy, Utc::now()) {
            debug!(url = %url, path = ?path, "cache hit");
            return Ok(path);
        }

        debug!(url = %url, "cache miss");
        let bytes = fetcher.fetch(url)?;
        write_replacing(&dir, &path, &bytes)?;
        debug!(url = %url, path = ?path, size = bytes.len(), "cached image");
        Ok(path)
    }

    /// Best-effort removal of every file directly inside `cached_images/`.
    ///
    /// Subdirectories are skipped, a missing directory is a no-op, and one
    /// failed deletion never aborts the rest. Failures are logged only.
    pub fn clear(&self) {
        let dir = self.dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) => {
                warn!(dir = ?dir, error = %e, "failed to list cache directory");
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(dir = ?dir, error = %e, "failed to read cache entry");
                    continue;
                }
            };
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Err(e) = fs::remove_file(entry.path()) {
                warn!(path = ?entry.path(), error = %e, "failed to delete cache entry");
            }
        }
    }
}

/// Whether `path` exists and is within the policy's age limit at `now`.
/// Age is the whole-day difference from the file's last-modified time,
/// truncating; an age exactly equal to the limit is still fresh.
fn is_fresh(path: &Path, policy: &CachePolicy, now: DateTime<Utc>) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    let Some(max_age_days) = policy.max_age_days else {
        return true;
    };
    let Ok(modified) = metadata.modified() else {
        return false;
    };
    let age_days = (now - DateTime::<Utc>::from(modified)).num_days();
    age_days <= max_age_days
}

/// Write `bytes` to a unique temp file in `dir`, then rename over `path`.
fn write_replacing(dir: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct CountingFetcher {
        payload: Vec<u8>,
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn new(payload: &[u8]) -> Self {
            Self {
                payload: payload.to_vec(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Fetch for CountingFetcher {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.payload.clone())
        }
    }

    struct FailingFetcher;

    impl Fetch for FailingFetcher {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            Err(LoadError::Storage(std::io::Error::other("unreachable")))
        }
    }

    #[test]
    fn test_path_for_uses_fingerprint_and_extension() {
        let cache = ImageCache::new("/tmp/host-cache");
        let path = cache.path_for("https://example.com/photo.png");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(name.len(), 32 + ".png".len());
        assert!(name.ends_with(".png"));
        assert!(path.starts_with("/tmp/host-cache/cached_images"));
    }

    #[test]
    fn test_resolve_round_trip_fetches_once() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path());
        let fetcher = CountingFetcher::new(b"image bytes");
        let policy = CachePolicy::default();
        let url = "https://example.com/photo.jpg";

        let first = cache.resolve(url, &policy, &fetcher).unwrap();
        assert_eq!(fs::read(&first).unwrap(), b"image bytes");
        assert_eq!(fetcher.calls(), 1);

        let second = cache.resolve(url, &policy, &fetcher).unwrap();
        assert_eq!(second, first);
        assert_eq!(fetcher.calls(), 1, "second resolve must not hit the network");
    }

    #[test]
    fn test_resolve_refetches_when_expired() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path());
        let fetcher = CountingFetcher::new(b"new bytes");
        let url = "https://example.com/photo.jpg";

        // Seed the cache file, then evaluate freshness with a shifted "now"
        // instead of rewinding the file's mtime.
        cache
            .resolve(url, &CachePolicy::default(), &fetcher)
            .unwrap();
        assert_eq!(fetcher.calls(), 1);

        let policy = CachePolicy {
            enabled: true,
            max_age_days: Some(7),
        };
        let path = cache.path_for(url);

        // Exactly 7 days old: still fresh on the <= boundary.
        assert!(is_fresh(&path, &policy, Utc::now() + Duration::days(7)));
        // 8 days old: expired.
        assert!(!is_fresh(&path, &policy, Utc::now() + Duration::days(8)));
    }

    #[test]
    fn test_is_fresh_missing_file() {
        let policy = CachePolicy::default();
        assert!(!is_fresh(
            Path::new("/nonexistent/cached_images/deadbeef.png"),
            &policy,
            Utc::now()
        ));
    }

    #[test]
    fn test_is_fresh_no_max_age_never_expires() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entry.png");
        fs::write(&path, b"x").unwrap();

        let policy = CachePolicy::default();
        // Far future "now": still fresh without an age limit.
        assert!(is_fresh(&path, &policy, Utc::now() + Duration::days(10_000)));
    }

    #[test]
    fn test_resolve_propagates_fetch_error_and_keeps_nothing() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path());
        let url = "https://example.com/photo.jpg";

        assert!(cache
            .resolve(url, &CachePolicy::default(), &FailingFetcher)
            .is_err());
        assert!(!cache.path_for(url).exists());
    }

    #[test]
    fn test_clear_removes_files_but_not_subdirs() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path());
        let fetcher = CountingFetcher::new(b"bytes");

        cache
            .resolve("https://example.com/a.png", &CachePolicy::default(), &fetcher)
            .unwrap();
        cache
            .resolve("https://example.com/b.png", &CachePolicy::default(), &fetcher)
            .unwrap();

        let nested = cache.dir().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("keep.png"), b"kept").unwrap();

        cache.clear();

        let remaining: Vec<_> = fs::read_dir(cache.dir()).unwrap().collect();
        assert_eq!(remaining.len(), 1, "only the subdirectory should remain");
        assert!(nested.join("keep.png").exists());
    }

    #[test]
    fn test_clear_missing_dir_is_noop() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path());
        // cached_images/ was never created
        cache.clear();
    }

    #[test]
    fn test_concurrent_resolves_leave_one_intact_encoding() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path());
        let url = "https://example.com/photo.png";

        let payload_a = vec![b'a'; 256 * 1024];
        let payload_b = vec![b'b'; 256 * 1024];

        std::thread::scope(|scope| {
            for payload in [&payload_a, &payload_b] {
                let cache = cache.clone();
                scope.spawn(move || {
                    let fetcher = CountingFetcher::new(payload);
                    // Force a miss each time so both threads write.
                    let policy = CachePolicy {
                        enabled: true,
                        max_age_days: Some(-1),
                    };
                    cache.resolve(url, &policy, &fetcher).unwrap();
                });
            }
        });

        let written = fs::read(cache.path_for(url)).unwrap();
        assert!(
            written == payload_a || written == payload_b,
            "cache file must be exactly one of the two encodings"
        );
    }
}
