//! Listening-to service façade.
//!
//! [`ListeningService`] is the host integration: a build tool resolves the
//! virtual module id through it, clears its cache when a build starts, and
//! loads the module source, which embeds the current [`ResolvedTrack`] as JSON.
//!
//! ```ignore
//! use core_service::{ListeningService, VIRTUAL_MODULE_ID};
//! use core_runtime::config::ListeningConfig;
//!
//! let service = ListeningService::new(ListeningConfig::from_env()?)?;
//! service.build_start();
//!
//! let id = service.resolve_id(VIRTUAL_MODULE_ID).expect("virtual module");
//! let source = service.load(id).await?;
//! ```
//!
//! Each service instance owns its own cache. Two concurrent loads that both
//! miss the cache both run the full pipeline and both store their result;
//! there is no single-flight guard.

pub mod error;

pub use error::{CoreError, Result};

use core_metadata::{
    build_providers, CoverThumbnailer, LastFmNowPlaying, LinkAggregator, LinkSet,
    NowPlayingSource, ResolvedTrack, ThumbnailService,
};
use core_runtime::cache::TtlCache;
use core_runtime::config::{ListeningConfig, ListeningOptions};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Integration name reported to the host.
pub const PLUGIN_NAME: &str = "vite-listening-to";

/// Module id importers use.
pub const VIRTUAL_MODULE_ID: &str = "virtual:vite-listening-to";

/// Resolved id; the NUL prefix keeps other resolvers away from it.
pub const RESOLVED_MODULE_ID: &str = "\0virtual:vite-listening-to";

/// Primary façade exposed to host integrations.
pub struct ListeningService {
    now_playing: Arc<dyn NowPlayingSource>,
    aggregator: LinkAggregator,
    thumbnailer: Arc<dyn CoverThumbnailer>,
    cache: Mutex<TtlCache<ResolvedTrack>>,
}

impl ListeningService {
    /// Wires the Last.fm source, the configured providers and the thumbnailer
    /// onto the config's HTTP client.
    pub fn new(config: ListeningConfig) -> Result<Self> {
        config.validate()?;

        info!(
            user = %config.lastfm_user,
            providers = ?config.providers,
            cache_ttl_ms = config.cache_ttl_ms,
            "Configuring listening service"
        );

        let http_client = config.http_client;
        let now_playing = Arc::new(LastFmNowPlaying::new(
            Arc::clone(&http_client),
            config.lastfm_user,
            config.lastfm_api_key,
        ));
        let aggregator =
            LinkAggregator::new(build_providers(&config.providers, Arc::clone(&http_client)));
        let thumbnailer = Arc::new(ThumbnailService::new(http_client));
        let cache = TtlCache::with_clock(config.cache_ttl_ms, config.clock);

        Ok(Self::with_components(now_playing, aggregator, thumbnailer, cache))
    }

    /// Builds a service from a host options document.
    pub fn from_options(options: ListeningOptions) -> Result<Self> {
        Self::new(ListeningConfig::from_options(options)?)
    }

    /// Create a service from explicit collaborators.
    pub fn with_components(
        now_playing: Arc<dyn NowPlayingSource>,
        aggregator: LinkAggregator,
        thumbnailer: Arc<dyn CoverThumbnailer>,
        cache: TtlCache<ResolvedTrack>,
    ) -> Self {
        Self {
            now_playing,
            aggregator,
            thumbnailer,
            cache: Mutex::new(cache),
        }
    }

    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    pub fn resolve_id(&self, id: &str) -> Option<&'static str> {
        (id == VIRTUAL_MODULE_ID).then_some(RESOLVED_MODULE_ID)
    }

    /// Drops the cached track so the next load fetches fresh data.
    pub fn build_start(&self) {
        self.lock_cache().clear();
        debug!("Cleared cached track");
    }

    /// Returns the cached track, or fetches and caches a fresh one.
    ///
    /// Errors from the now-playing source propagate and leave the cache as it was.
    pub async fn current_track(&self) -> Result<ResolvedTrack> {
        if let Some(track) = self.cached_track() {
            info!(title = %track.title, "Using cached track");
            return Ok(track);
        }

        info!("Fetching fresh now-playing data");
        let track = self.fetch_track().await?;

        self.lock_cache().set(track.clone());
        info!(title = %track.title, "Cached track");

        Ok(track)
    }

    /// Source of the resolved virtual module, or `None` for any other id.
    pub async fn load(&self, id: &str) -> Result<Option<String>> {
        if id != RESOLVED_MODULE_ID {
            return Ok(None);
        }

        let track = self.current_track().await?;
        render_module(&track).map(Some)
    }

    async fn fetch_track(&self) -> Result<ResolvedTrack> {
        let track = self.now_playing.now_playing().await?;

        if track.is_empty() {
            debug!("No recent track, skipping link resolution");
            return Ok(ResolvedTrack::new(&track, LinkSet::new(), None));
        }

        let (services, album_cover) = futures::join!(
            self.aggregator.resolve(&track.title, &track.artist),
            self.thumbnailer
                .resize_to_data_uri(track.cover_url.as_deref()),
        );

        Ok(ResolvedTrack::new(&track, services, album_cover))
    }

    fn cached_track(&self) -> Option<ResolvedTrack> {
        self.lock_cache().get().cloned()
    }

    // The lock is never held across an await.
    fn lock_cache(&self) -> MutexGuard<'_, TtlCache<ResolvedTrack>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Renders the module source embedding `track`.
pub fn render_module(track: &ResolvedTrack) -> Result<String> {
    let json = serde_json::to_string(track)?;
    Ok(format!("export const musicTrack: MusicTrack = {};", json))
}
