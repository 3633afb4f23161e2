//! Snapshot-cached data manager for the dashboard runtime.
//!
//! Wraps [`load_leads`] with a cache keyed on the resolved source file and
//! its modification time, so switching windows or redrawing never re-reads
//! an unchanged extract. Callers use [`DataManager::get_data`] to obtain a
//! fresh-or-cached [`LoadResult`]; the manager handles change detection,
//! manual invalidation and graceful fallback to the previous snapshot when
//! a reload fails.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use lens_core::time_utils::TimezoneHandler;
use lens_data::reader::{latest_csv_in, load_leads, LoadResult};

/// Identity of a loaded snapshot: the file it came from and its mtime.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    source: PathBuf,
    modified: SystemTime,
}

// ── DataManager ───────────────────────────────────────────────────────────────

/// Change-detecting cache around the loading pipeline.
///
/// # Example
/// ```no_run
/// use lens_core::time_utils::TimezoneHandler;
/// use lens_runtime::DataManager;
///
/// let tz = TimezoneHandler::new("UTC");
/// let mut mgr = DataManager::new("./leads.csv".into(), tz, None);
/// let result = mgr.get_data(false);
/// println!("loaded {} leads", result.records.len());
/// ```
pub struct DataManager {
    /// The configured data path (file or directory).
    data_path: PathBuf,
    /// Timezone handler for interpreting naive extract timestamps.
    timezone: TimezoneHandler,
    /// Optional instance tag filter forwarded to the loader.
    instance: Option<String>,
    /// Most recently loaded snapshot.
    cache: Option<LoadResult>,
    /// Identity of the cached snapshot.
    cache_key: Option<CacheKey>,
    /// Human-readable description of the last load failure.
    last_error: Option<String>,
}

impl DataManager {
    pub fn new(data_path: PathBuf, timezone: TimezoneHandler, instance: Option<String>) -> Self {
        Self {
            data_path,
            timezone,
            instance,
            cache: None,
            cache_key: None,
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the dataset, reloading only when the source file changed.
    ///
    /// When `force_refresh` is `true` the cache is bypassed and a fresh
    /// load is always attempted.  When the load panics the previous
    /// snapshot (if any) is returned as a best-effort fallback; when there
    /// is none, an empty result carrying the failure message is returned.
    pub fn get_data(&mut self, force_refresh: bool) -> &LoadResult {
        let current_key = self.current_key();
        let needs_reload =
            force_refresh || self.cache.is_none() || self.cache_key != current_key;

        if needs_reload {
            match self.load_snapshot() {
                Ok(result) => {
                    tracing::debug!(
                        records = result.records.len(),
                        invalid = result.invalid.len(),
                        "dataset snapshot updated"
                    );
                    self.last_error = result.source_error.clone();
                    self.cache = Some(result);
                    self.cache_key = current_key;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "load failed; falling back to cached snapshot");
                    self.last_error = Some(e.clone());
                    if self.cache.is_none() {
                        self.cache = Some(LoadResult {
                            source_error: Some(e),
                            ..Default::default()
                        });
                    }
                }
            }
        } else {
            tracing::debug!("returning cached dataset snapshot");
        }

        // Every path above leaves the cache populated.
        self.cache.get_or_insert_with(LoadResult::default)
    }

    /// Discard the current snapshot, forcing the next [`DataManager::get_data`]
    /// call to reload.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        self.cache_key = None;
        tracing::debug!("snapshot cache invalidated");
    }

    /// `true` when the source file changed since the cached snapshot was taken.
    pub fn is_stale(&self) -> bool {
        self.cache.is_some() && self.cache_key != self.current_key()
    }

    /// Human-readable description of the last load failure, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The configured data path.
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// Compute the identity of the file a load would read right now.
    ///
    /// `None` when no source file can be resolved, which also forces a
    /// reload (the loader will then surface the proper error message).
    fn current_key(&self) -> Option<CacheKey> {
        let source = if self.data_path.is_dir() {
            latest_csv_in(&self.data_path)?
        } else {
            self.data_path.clone()
        };

        let modified = std::fs::metadata(&source).and_then(|m| m.modified()).ok()?;
        Some(CacheKey { source, modified })
    }

    /// Run the loader, trapping panics so a malformed extract can never
    /// take down the dashboard loop.
    fn load_snapshot(&self) -> Result<LoadResult, String> {
        catch_unwind(AssertUnwindSafe(|| {
            load_leads(&self.data_path, &self.timezone, self.instance.as_deref())
        }))
        .map_err(|payload| {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            format!("load panicked: {}", reason)
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
