//! Tile URL builders for the base map and radar overlay servers.
//!
//! # URL Patterns
//!
//! - Base map: `{tile_server}/{zoom}/{x}/{y}.png`
//! - Radar overlay: `{radar_tile_server}/v2/radar/{timestamp}/256/{zoom}/{x}/{y}/{color}/{smoothing}.png`
//!
//! Tile indices are signed: ranges near the map edge produce negative or
//! overflowing addresses, which the servers answer with 404 and the fetch
//! layer treats as a missing tile.

/// Base-map (OSM-style) tile source.
#[derive(Debug, Clone)]
pub struct BasemapSource {
    base_url: String,
}

impl BasemapSource {
    /// Creates a source rooted at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Builds the tile URL for the given address.
    pub fn tile_url(&self, zoom: u8, x: i32, y: i32) -> String {
        format!("{}/{}/{}/{}.png", self.base_url, zoom, x, y)
    }
}

/// Radar overlay tile source (RainViewer v2 layout).
///
/// Radar tiles are additionally keyed by the Unix-second timestamp of the
/// radar scan, plus a color scheme and smoothing flag baked into the path.
#[derive(Debug, Clone)]
pub struct RadarSource {
    base_url: String,
    color_scheme: u8,
    smoothing: String,
}

impl RadarSource {
    /// Creates a source rooted at `base_url` with rendering options.
    pub fn new(base_url: impl Into<String>, color_scheme: u8, smoothing: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            color_scheme,
            smoothing: smoothing.into(),
        }
    }

    /// Builds the tile URL for the given timestamp and address.
    pub fn tile_url(&self, timestamp: i64, zoom: u8, x: i32, y: i32) -> String {
        format!(
            "{}/v2/radar/{}/256/{}/{}/{}/{}/{}.png",
            self.base_url, timestamp, zoom, x, y, self.color_scheme, self.smoothing
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basemap_url_construction() {
        let source = BasemapSource::new("https://tile.openstreetmap.org");
        assert_eq!(
            source.tile_url(8, 138, 87),
            "https://tile.openstreetmap.org/8/138/87.png"
        );
    }

    #[test]
    fn test_basemap_url_negative_index() {
        let source = BasemapSource::new("https://tile.openstreetmap.org");
        assert_eq!(
            source.tile_url(2, -2, 1),
            "https://tile.openstreetmap.org/2/-2/1.png"
        );
    }

    #[test]
    fn test_radar_url_construction() {
        let source = RadarSource::new("https://tilecache.rainviewer.com", 2, "1_1");
        assert_eq!(
            source.tile_url(1700000000, 8, 138, 87),
            "https://tilecache.rainviewer.com/v2/radar/1700000000/256/8/138/87/2/1_1.png"
        );
    }

    #[test]
    fn test_radar_url_carries_scheme_and_smoothing() {
        let source = RadarSource::new("https://tiles.example", 4, "0_0");
        let url = source.tile_url(1, 3, 0, 0);
        assert!(url.ends_with("/4/0_0.png"));
    }
}
