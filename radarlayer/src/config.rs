//! Service configuration.
//!
//! `RadarConfig` collects every tunable of the compositing engine: endpoint
//! roots, radar rendering options, network limits, caption labels, and the
//! font lookup paths for the caption renderer. Defaults reproduce the
//! public RainViewer + OpenStreetMap setup.

use std::path::PathBuf;
use std::time::Duration;

/// Default base-map tile server.
pub const DEFAULT_TILE_SERVER: &str = "https://tile.openstreetmap.org";

/// Default radar overlay tile server.
pub const DEFAULT_RADAR_TILE_SERVER: &str = "https://tilecache.rainviewer.com";

/// Default radar metadata API root.
pub const DEFAULT_RADAR_API: &str = "https://api.rainviewer.com";

/// Default radar color scheme (RainViewer "universal blue").
pub const DEFAULT_COLOR_SCHEME: u8 = 2;

/// Default smoothing/snow flag pair in the radar tile path.
pub const DEFAULT_SMOOTHING: &str = "1_1";

/// Default per-request timeout.
///
/// Applies to each tile and metadata request individually; a composite
/// covering many tiles never accumulates a global deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Default cap on concurrently in-flight tile fetches.
///
/// Tile counts per composite are on the order of tens; a small worker pool
/// keeps the tile servers happy without stalling the composite on one slow
/// response.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;

/// Default opacity applied to the radar overlay layer.
pub const DEFAULT_OVERLAY_ALPHA: f32 = 0.7;

/// Configuration for [`RadarService`](crate::service::RadarService).
#[derive(Debug, Clone)]
pub struct RadarConfig {
    /// Base-map tile server root (no trailing slash).
    pub tile_server: String,

    /// Radar overlay tile server root (no trailing slash).
    pub radar_tile_server: String,

    /// Radar metadata API root (no trailing slash).
    pub radar_api: String,

    /// Radar color scheme index in the tile path.
    pub color_scheme: u8,

    /// Smoothing/snow flag pair in the tile path.
    pub smoothing: String,

    /// Per-request HTTP timeout.
    pub request_timeout: Duration,

    /// Maximum concurrently in-flight tile fetches.
    pub max_concurrent_fetches: usize,

    /// User agent sent with every request.
    pub user_agent: String,

    /// Caption tag for frames at or before the newest radar scan.
    pub past_label: String,

    /// Caption tag for nowcast frames after the newest radar scan.
    pub forecast_label: String,

    /// Font files to try, in order, for caption text. The first readable
    /// one wins; with none, caption bars render without text.
    pub font_candidates: Vec<PathBuf>,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            tile_server: DEFAULT_TILE_SERVER.to_string(),
            radar_tile_server: DEFAULT_RADAR_TILE_SERVER.to_string(),
            radar_api: DEFAULT_RADAR_API.to_string(),
            color_scheme: DEFAULT_COLOR_SCHEME,
            smoothing: DEFAULT_SMOOTHING.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            user_agent: concat!("radarlayer/", env!("CARGO_PKG_VERSION")).to_string(),
            past_label: "past".to_string(),
            forecast_label: "forecast".to_string(),
            font_candidates: default_font_candidates(),
        }
    }
}

impl RadarConfig {
    /// Set the base-map tile server root.
    pub fn with_tile_server(mut self, url: impl Into<String>) -> Self {
        self.tile_server = url.into();
        self
    }

    /// Set the radar tile server root.
    pub fn with_radar_tile_server(mut self, url: impl Into<String>) -> Self {
        self.radar_tile_server = url.into();
        self
    }

    /// Set the metadata API root.
    pub fn with_radar_api(mut self, url: impl Into<String>) -> Self {
        self.radar_api = url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the concurrent fetch cap (clamped to at least 1).
    pub fn with_max_concurrent_fetches(mut self, cap: usize) -> Self {
        self.max_concurrent_fetches = cap.max(1);
        self
    }

    /// Set the caption labels for past and forecast frames.
    pub fn with_caption_labels(
        mut self,
        past: impl Into<String>,
        forecast: impl Into<String>,
    ) -> Self {
        self.past_label = past.into();
        self.forecast_label = forecast.into();
        self
    }
}

/// Common font locations across Linux and macOS.
fn default_font_candidates() -> Vec<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/System/Library/Fonts/Helvetica.ttc",
        "/Library/Fonts/Arial.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_endpoints() {
        let config = RadarConfig::default();
        assert_eq!(config.tile_server, DEFAULT_TILE_SERVER);
        assert_eq!(config.radar_tile_server, DEFAULT_RADAR_TILE_SERVER);
        assert_eq!(config.radar_api, DEFAULT_RADAR_API);
        assert_eq!(config.color_scheme, 2);
        assert_eq!(config.smoothing, "1_1");
    }

    #[test]
    fn test_builder_overrides() {
        let config = RadarConfig::default()
            .with_tile_server("http://localhost:9000")
            .with_request_timeout(Duration::from_secs(1))
            .with_max_concurrent_fetches(0)
            .with_caption_labels("minulost", "predpoved");
        assert_eq!(config.tile_server, "http://localhost:9000");
        assert_eq!(config.request_timeout, Duration::from_secs(1));
        // Zero workers would deadlock the fetch stream; clamped up.
        assert_eq!(config.max_concurrent_fetches, 1);
        assert_eq!(config.past_label, "minulost");
    }

    #[test]
    fn test_user_agent_carries_version() {
        let config = RadarConfig::default();
        assert!(config.user_agent.starts_with("radarlayer/"));
    }
}
