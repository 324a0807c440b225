//! Asynchronous asset loading for element images and garment mockups.
//!
//! ```text
//!  request(src) ──▶ AssetSource::load ──▶ pending set ──▶ complete ──▶ AssetCache
//!                    (async, may fail)    (FuturesUnordered)           Loading | Ready | Failed
//! ```
//!
//! Loads are independent: each completion is applied on its own, so a slow
//! mockup never holds back an uploaded image. The pending set is owned by the
//! loader; dropping the loader drops every in-flight future with it, so a
//! completion can never land on a torn-down editor.

use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};

use crate::error::{RenderError, RenderResult};
use crate::image::{load_image_from_data_uri, TextureData};

/// Somewhere image bytes come from: data URIs, the filesystem, HTTP.
#[async_trait(?Send)]
pub trait AssetSource {
    /// Fetch and decode the image named by `source`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::AssetLoad`] if the image cannot be fetched or
    /// decoded.
    async fn load(&self, source: &str) -> RenderResult<TextureData>;
}

/// Decodes `data:` URIs and refuses everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUriSource;

#[async_trait(?Send)]
impl AssetSource for DataUriSource {
    async fn load(&self, source: &str) -> RenderResult<TextureData> {
        if !source.starts_with("data:") {
            return Err(RenderError::AssetLoad(format!(
                "No loader for non-data source: {}",
                truncate_source(source)
            )));
        }
        load_image_from_data_uri(source)
    }
}

/// A decoded asset, re-encoded as a PNG data URI for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedAsset {
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// `data:image/png;base64,...`
    pub png_data_uri: String,
}

/// Load state of one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetState {
    /// Requested; not finished yet.
    Loading,
    /// Decoded and ready to draw.
    Ready(LoadedAsset),
    /// Fetch or decode failed; drawn as a placeholder.
    Failed(String),
}

/// Counters for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered from the cache.
    pub hits: u64,
    /// Requests that started a load.
    pub misses: u64,
    /// Loads that finished successfully.
    pub loaded: u64,
    /// Loads that failed.
    pub failed: u64,
}

/// Load states keyed by source string.
#[derive(Debug, Default)]
pub struct AssetCache {
    entries: HashMap<String, AssetState>,
}

impl AssetCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State of `source`, if it was ever requested.
    #[must_use]
    pub fn get(&self, source: &str) -> Option<&AssetState> {
        self.entries.get(source)
    }

    /// Number of known sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no source was ever requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn set(&mut self, source: String, state: AssetState) {
        self.entries.insert(source, state);
    }
}

/// A finished load, not yet applied to a cache.
#[derive(Debug)]
pub struct CompletedLoad {
    /// Source that was loaded.
    pub source: String,
    /// Decoded pixels or the failure.
    pub result: RenderResult<TextureData>,
}

type PendingLoad = LocalBoxFuture<'static, CompletedLoad>;

/// In-flight loads, detachable from the loader so they can be awaited
/// without holding a borrow on it.
#[derive(Default)]
pub struct PendingLoads {
    inner: FuturesUnordered<PendingLoad>,
}

impl PendingLoads {
    /// Wait for the next load to finish, in completion order.
    pub async fn next(&mut self) -> Option<CompletedLoad> {
        self.inner.next().await
    }

    /// Number of loads still running.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn push(&mut self, load: PendingLoad) {
        self.inner.push(load);
    }

    fn append(&mut self, other: PendingLoads) {
        self.inner.extend(other.inner);
    }
}

impl std::fmt::Debug for PendingLoads {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLoads").field("len", &self.len()).finish()
    }
}

/// Starts loads through an [`AssetSource`] and records their outcome.
pub struct AssetLoader {
    source: Rc<dyn AssetSource>,
    cache: AssetCache,
    pending: PendingLoads,
    stats: CacheStats,
}

impl AssetLoader {
    /// Create a loader over a source.
    #[must_use]
    pub fn new(source: Rc<dyn AssetSource>) -> Self {
        Self {
            source,
            cache: AssetCache::new(),
            pending: PendingLoads::default(),
            stats: CacheStats::default(),
        }
    }

    /// Current load state of `source`, starting a load the first time it is
    /// asked for. Failed sources are not retried.
    pub fn request(&mut self, source: &str) -> &AssetState {
        if self.cache.entries.contains_key(source) {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
            tracing::debug!("Loading asset {}", truncate_source(source));
            let key = source.to_string();
            let loader = Rc::clone(&self.source);
            self.pending.push(
                async move {
                    let result = loader.load(&key).await;
                    CompletedLoad {
                        source: key,
                        result,
                    }
                }
                .boxed_local(),
            );
            self.cache.set(source.to_string(), AssetState::Loading);
        }
        &self.cache.entries[source]
    }

    /// Load states of everything requested so far.
    #[must_use]
    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    /// Cache counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Whether any load is still running.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Record a finished load. Returns `true` if the asset is now drawable.
    pub fn complete(&mut self, done: CompletedLoad) -> bool {
        let state = match done.result.and_then(|texture| {
            let png_data_uri = texture.to_png_data_uri()?;
            Ok(LoadedAsset {
                width: texture.width,
                height: texture.height,
                png_data_uri,
            })
        }) {
            Ok(asset) => {
                self.stats.loaded += 1;
                tracing::debug!(
                    "Asset ready ({}x{}): {}",
                    asset.width,
                    asset.height,
                    truncate_source(&done.source)
                );
                AssetState::Ready(asset)
            }
            Err(e) => {
                self.stats.failed += 1;
                tracing::warn!("Asset failed, drawing placeholder: {e}");
                AssetState::Failed(e.to_string())
            }
        };
        let ready = matches!(state, AssetState::Ready(_));
        self.cache.set(done.source, state);
        ready
    }

    /// Wait for the next in-flight load and record it.
    ///
    /// Returns the source that finished, or `None` when nothing is pending.
    pub async fn next_loaded(&mut self) -> Option<String> {
        let done = self.pending.next().await?;
        let source = done.source.clone();
        self.complete(done);
        Some(source)
    }

    /// Record every load that has already finished, without waiting.
    ///
    /// Returns how many completions were applied.
    pub fn poll_loaded(&mut self) -> usize {
        let mut applied = 0;
        while let Some(Some(done)) = self.pending.next().now_or_never() {
            self.complete(done);
            applied += 1;
        }
        applied
    }

    /// Drive every pending load (including ones started meanwhile) to
    /// completion.
    pub async fn load_all(&mut self) {
        while self.next_loaded().await.is_some() {}
    }

    /// Detach the in-flight loads so the caller can await them without
    /// borrowing the loader. Feed results back through [`Self::complete`].
    pub fn take_pending(&mut self) -> PendingLoads {
        std::mem::take(&mut self.pending)
    }

    /// Re-attach loads detached by [`Self::take_pending`] that were not
    /// awaited to completion.
    pub fn restore_pending(&mut self, pending: PendingLoads) {
        self.pending.append(pending);
    }

    /// Forget every finished source `keep` rejects, e.g. images of deleted
    /// elements. Entries still loading stay until their load lands, so a
    /// source requested again mid-load is not fetched twice.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        let before = self.cache.len();
        self.cache
            .entries
            .retain(|source, state| matches!(state, AssetState::Loading) || keep(source));
        let evicted = before - self.cache.len();
        if evicted > 0 {
            tracing::trace!("Evicted {evicted} unused assets");
        }
    }
}

impl std::fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoader")
            .field("cached", &self.cache.len())
            .field("pending", &self.pending.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Shorten data URIs for log lines.
pub(crate) fn truncate_source(source: &str) -> &str {
    const MAX: usize = 64;
    if source.len() <= MAX {
        return source;
    }
    let mut end = MAX;
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    &source[..end]
}
