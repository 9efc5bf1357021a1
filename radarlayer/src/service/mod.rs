//! Radar composite service.
//!
//! `RadarService` is the consumer-facing surface of the engine: one call
//! for a cached static composite, one for an animated frame sequence. It
//! owns the snapshot cache, the HTTP client, the endpoint configuration,
//! and the caption font; no state is process-global.
//!
//! # Example
//!
//! ```ignore
//! use radarlayer::{GeoPoint, RadarConfig, RadarService, StaticRequest, Viewport};
//! use tokio_util::sync::CancellationToken;
//!
//! let service = RadarService::new(RadarConfig::default())?;
//! let request = StaticRequest::new(GeoPoint::new(49.3105, 14.1415), Viewport::new(640, 480, 8));
//! let image = service.get_static(&request, &CancellationToken::new()).await?;
//! ```

mod error;

pub use error::RadarError;

use std::path::PathBuf;
use std::time::Duration;

use ab_glyph::FontArc;
use chrono::TimeZone;
use image::RgbaImage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::animation::{select_window, RadarFrame};
use crate::cache::{CompositeSnapshot, SnapshotCache};
use crate::compose::{blit_base_layer, compose_layers, overlay_radar_layer, Canvas};
use crate::config::{RadarConfig, DEFAULT_OVERLAY_ALPHA};
use crate::coord::{GeoPoint, TileRange, Viewport};
use crate::fetch::{fetch_layer, FetchedTile};
use crate::provider::{
    latest_timestamp, timeline, AsyncHttpClient, BasemapSource, RadarSource, ReqwestClient,
    Timeline,
};

/// Default TTL for static composites, in minutes.
pub const DEFAULT_TTL_MINUTES: u32 = 3;

/// Default backward window for animations, in minutes.
pub const DEFAULT_PAST_MINUTES: u32 = 60;

/// Default forward window for animations, in minutes.
pub const DEFAULT_FUTURE_MINUTES: u32 = 120;

/// Parameters of a static composite request.
#[derive(Debug, Clone, Copy)]
pub struct StaticRequest {
    /// Center of the viewport.
    pub point: GeoPoint,
    /// Output dimensions and zoom.
    pub viewport: Viewport,
    /// Maximum age at which a cached composite may be reused.
    pub ttl_minutes: u32,
    /// Opacity of the radar layer, in `[0, 1]`.
    pub overlay_alpha: f32,
}

impl StaticRequest {
    /// Creates a request with the default TTL and overlay alpha.
    pub fn new(point: GeoPoint, viewport: Viewport) -> Self {
        Self {
            point,
            viewport,
            ttl_minutes: DEFAULT_TTL_MINUTES,
            overlay_alpha: DEFAULT_OVERLAY_ALPHA,
        }
    }

    /// Set the cache TTL in minutes.
    pub fn with_ttl_minutes(mut self, minutes: u32) -> Self {
        self.ttl_minutes = minutes;
        self
    }

    /// Set the radar overlay opacity.
    pub fn with_overlay_alpha(mut self, alpha: f32) -> Self {
        self.overlay_alpha = alpha;
        self
    }
}

/// Parameters of an animated sequence request.
#[derive(Debug, Clone, Copy)]
pub struct AnimationRequest {
    /// Center of the viewport.
    pub point: GeoPoint,
    /// Output dimensions and zoom.
    pub viewport: Viewport,
    /// How far back frames are kept, in minutes.
    pub past_minutes: u32,
    /// How far forward nowcast frames are kept, in minutes.
    pub future_minutes: u32,
    /// Opacity of the radar layer, in `[0, 1]`.
    pub overlay_alpha: f32,
}

impl AnimationRequest {
    /// Creates a request with the default window and overlay alpha.
    pub fn new(point: GeoPoint, viewport: Viewport) -> Self {
        Self {
            point,
            viewport,
            past_minutes: DEFAULT_PAST_MINUTES,
            future_minutes: DEFAULT_FUTURE_MINUTES,
            overlay_alpha: DEFAULT_OVERLAY_ALPHA,
        }
    }

    /// Set the animation window in minutes.
    pub fn with_window(mut self, past_minutes: u32, future_minutes: u32) -> Self {
        self.past_minutes = past_minutes;
        self.future_minutes = future_minutes;
        self
    }

    /// Set the radar overlay opacity.
    pub fn with_overlay_alpha(mut self, alpha: f32) -> Self {
        self.overlay_alpha = alpha;
        self
    }
}

/// The radar tile compositing and caching engine.
pub struct RadarService<C = ReqwestClient> {
    http: C,
    config: RadarConfig,
    basemap: BasemapSource,
    radar: RadarSource,
    cache: SnapshotCache,
    font: Option<FontArc>,
}

impl RadarService<ReqwestClient> {
    /// Creates a service with a real HTTP client built from `config`.
    pub fn new(config: RadarConfig) -> Result<Self, RadarError> {
        let http = ReqwestClient::new(config.request_timeout, &config.user_agent)
            .map_err(RadarError::ClientSetup)?;
        Ok(Self::with_client(config, http))
    }
}

impl<C: AsyncHttpClient> RadarService<C> {
    /// Creates a service over an injected HTTP client.
    pub fn with_client(config: RadarConfig, http: C) -> Self {
        let basemap = BasemapSource::new(config.tile_server.clone());
        let radar = RadarSource::new(
            config.radar_tile_server.clone(),
            config.color_scheme,
            config.smoothing.clone(),
        );
        let font = load_caption_font(&config.font_candidates);
        if font.is_none() {
            warn!("no caption font found; animation captions will render without text");
        }
        Self {
            http,
            config,
            basemap,
            radar,
            cache: SnapshotCache::new(),
            font,
        }
    }

    /// Returns the current static composite, rebuilding on cache miss.
    ///
    /// A cached bitmap is reused when the request parameters match the
    /// cached ones and the entry is younger than the TTL; the caller
    /// always receives its own copy. On rebuild, the newest radar
    /// timestamp is fetched first (failure there fails the operation),
    /// then base and radar tiles are fetched best-effort and composited.
    pub async fn get_static(
        &self,
        request: &StaticRequest,
        cancel: &CancellationToken,
    ) -> Result<RgbaImage, RadarError> {
        let ttl = Duration::from_secs(u64::from(request.ttl_minutes) * 60);
        if let Some(hit) = self.cache.lookup(&request.point, &request.viewport, ttl) {
            debug!("static composite served from cache");
            return Ok(hit);
        }

        let timestamp = self.newest_timestamp(cancel).await?;
        let range = TileRange::around(&request.point, &request.viewport);
        debug!(
            tiles = range.tile_count(),
            zoom = request.viewport.zoom,
            timestamp,
            "rebuilding static composite"
        );

        let zoom = request.viewport.zoom;
        let base = self.fetch_basemap(&range, zoom, cancel).await?;
        let radar = self.fetch_radar(&range, zoom, timestamp, cancel).await?;

        let image = compose_layers(
            &base,
            &radar,
            &range,
            &request.viewport,
            request.overlay_alpha,
        );
        self.cache.store(CompositeSnapshot::new(
            image.clone(),
            request.point,
            request.viewport,
        ));
        Ok(image)
    }

    /// Builds the animated radar sequence for the requested window.
    ///
    /// The timeline fetch is fatal on failure; individual tile failures
    /// degrade single frames only. Frames come back strictly ascending by
    /// timestamp, the newest one carrying the highlight border.
    pub async fn get_animated(
        &self,
        request: &AnimationRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<RadarFrame>, RadarError> {
        let timeline = self.fetch_timeline(cancel).await?;
        let window = select_window(
            timeline.merged(),
            request.past_minutes,
            request.future_minutes,
        )
        .ok_or(RadarError::NoRadarData)?;

        let range = TileRange::around(&request.point, &request.viewport);
        let zoom = request.viewport.zoom;
        let base = self.base_map(request, &range, cancel).await?;

        let mut frames = Vec::with_capacity(window.stamps.len());
        for &(ts, is_past) in &window.stamps {
            let radar = self.fetch_radar(&range, zoom, ts, cancel).await?;

            let mut canvas = Canvas::from_image(base.clone());
            overlay_radar_layer(&mut canvas, &radar, &range, request.overlay_alpha);
            canvas.caption_bar(&self.caption_text(ts, is_past), self.font.as_ref());
            if ts == window.now {
                canvas.highlight_border();
            }

            frames.push(RadarFrame {
                image: canvas.into_image(),
                timestamp: ts,
                is_past,
            });
        }

        info!(frames = frames.len(), "animated radar sequence built");
        Ok(frames)
    }

    /// Drops all cached state.
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    /// The injected HTTP client. Useful to share one client across the
    /// radar, weather, and geo services, and to reach test doubles.
    pub fn http_client(&self) -> &C {
        &self.http
    }

    /// The base map for an animation: reused from the cache when the
    /// geography matches, built (and retained) otherwise.
    async fn base_map(
        &self,
        request: &AnimationRequest,
        range: &TileRange,
        cancel: &CancellationToken,
    ) -> Result<RgbaImage, RadarError> {
        if let Some(base) = self.cache.lookup_basemap(&request.point, &request.viewport) {
            debug!("animation base map reused from cache");
            return Ok(base);
        }

        let tiles = self
            .fetch_basemap(range, request.viewport.zoom, cancel)
            .await?;
        let mut canvas = Canvas::new(request.viewport.width, request.viewport.height);
        blit_base_layer(&mut canvas, &tiles, range);
        let image = canvas.into_image();

        self.cache.store_basemap(CompositeSnapshot::new(
            image.clone(),
            request.point,
            request.viewport,
        ));
        Ok(image)
    }

    async fn newest_timestamp(&self, cancel: &CancellationToken) -> Result<i64, RadarError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RadarError::Cancelled),
            result = latest_timestamp(&self.http, &self.config.radar_api) => {
                result.map_err(RadarError::from_metadata)
            }
        }
    }

    async fn fetch_timeline(&self, cancel: &CancellationToken) -> Result<Timeline, RadarError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RadarError::Cancelled),
            result = timeline(&self.http, &self.config.radar_api) => {
                result.map_err(RadarError::from_metadata)
            }
        }
    }

    async fn fetch_basemap(
        &self,
        range: &TileRange,
        zoom: u8,
        cancel: &CancellationToken,
    ) -> Result<Vec<FetchedTile>, RadarError> {
        fetch_layer(
            &self.http,
            range,
            |x, y| self.basemap.tile_url(zoom, x, y),
            self.config.max_concurrent_fetches,
            cancel,
        )
        .await
        .map_err(|_| RadarError::Cancelled)
    }

    async fn fetch_radar(
        &self,
        range: &TileRange,
        zoom: u8,
        timestamp: i64,
        cancel: &CancellationToken,
    ) -> Result<Vec<FetchedTile>, RadarError> {
        fetch_layer(
            &self.http,
            range,
            |x, y| self.radar.tile_url(timestamp, zoom, x, y),
            self.config.max_concurrent_fetches,
            cancel,
        )
        .await
        .map_err(|_| RadarError::Cancelled)
    }

    /// Caption text: localized `HH:MM` plus the past/forecast tag.
    fn caption_text(&self, timestamp: i64, is_past: bool) -> String {
        let label = if is_past {
            &self.config.past_label
        } else {
            &self.config.forecast_label
        };
        let time = chrono::Local
            .timestamp_opt(timestamp, 0)
            .single()
            .map(|dt| dt.format("%H:%M").to_string())
            .unwrap_or_else(|| timestamp.to_string());
        format!("{} · {}", time, label)
    }
}

/// Loads the first usable font from the candidate list.
fn load_caption_font(candidates: &[PathBuf]) -> Option<FontArc> {
    for path in candidates {
        if let Ok(bytes) = std::fs::read(path) {
            if let Ok(font) = FontArc::try_from_vec(bytes) {
                debug!(path = %path.display(), "caption font loaded");
                return Some(font);
            }
        }
    }
    None
}
