//! Radar metadata API client.
//!
//! Two endpoints, both JSON:
//!
//! - `{radar_api}/public/maps.json` — newest available radar timestamp.
//!   Served either as a bare array of Unix seconds or as an object with a
//!   `radar` array of `{time}` entries; the last element is newest. Both
//!   shapes must parse.
//! - `{radar_api}/public/weather-maps.json` — the full timeline:
//!   `radar.past[]` and `radar.nowcast[]` arrays of `{time}`.
//!
//! Metadata failures are fatal to the operation that needed them; there is
//! no stale fallback (see the error policy in [`crate::service`]).

use serde::Deserialize;
use thiserror::Error;

use super::{AsyncHttpClient, HttpError};

/// Errors from metadata retrieval or decoding.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The HTTP request failed (timeouts included).
    #[error("metadata request failed: {0}")]
    Http(#[from] HttpError),

    /// The payload was not valid JSON or not the expected shape.
    #[error("malformed metadata payload: {0}")]
    Parse(String),

    /// The payload parsed but contained no timestamps.
    #[error("metadata contained no radar timestamps")]
    Empty,
}

/// Radar frame timeline: historical scans plus near-future nowcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    /// Unix-second timestamps of past radar scans.
    pub past: Vec<i64>,
    /// Unix-second timestamps of forecast ("nowcast") frames.
    pub nowcast: Vec<i64>,
}

impl Timeline {
    /// All timestamps merged and sorted ascending.
    pub fn merged(&self) -> Vec<i64> {
        let mut stamps: Vec<i64> = self
            .past
            .iter()
            .chain(self.nowcast.iter())
            .copied()
            .collect();
        stamps.sort_unstable();
        stamps
    }
}

#[derive(Debug, Deserialize)]
struct WeatherMapsWire {
    radar: RadarWire,
}

#[derive(Debug, Deserialize)]
struct RadarWire {
    #[serde(default)]
    past: Vec<FrameWire>,
    #[serde(default)]
    nowcast: Vec<FrameWire>,
}

#[derive(Debug, Deserialize)]
struct FrameWire {
    time: i64,
}

/// Fetches the newest available radar timestamp from `maps.json`.
pub async fn latest_timestamp<C: AsyncHttpClient>(
    client: &C,
    api_base: &str,
) -> Result<i64, MetadataError> {
    let url = format!("{}/public/maps.json", api_base);
    let body = client.get(&url).await?;
    let value: serde_json::Value =
        serde_json::from_slice(&body).map_err(|e| MetadataError::Parse(e.to_string()))?;

    let newest = match &value {
        // Legacy shape: a bare array of Unix seconds.
        serde_json::Value::Array(stamps) => stamps.last().and_then(|v| v.as_i64()),
        // Current shape: {"radar": [{"time": ...}, ...]}.
        serde_json::Value::Object(map) => map
            .get("radar")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.last())
            .and_then(|entry| entry.get("time"))
            .and_then(|v| v.as_i64()),
        _ => None,
    };

    newest.ok_or(MetadataError::Empty)
}

/// Fetches the past + nowcast timeline from `weather-maps.json`.
pub async fn timeline<C: AsyncHttpClient>(
    client: &C,
    api_base: &str,
) -> Result<Timeline, MetadataError> {
    let url = format!("{}/public/weather-maps.json", api_base);
    let body = client.get(&url).await?;
    let wire: WeatherMapsWire =
        serde_json::from_slice(&body).map_err(|e| MetadataError::Parse(e.to_string()))?;

    Ok(Timeline {
        past: wire.radar.past.into_iter().map(|f| f.time).collect(),
        nowcast: wire.radar.nowcast.into_iter().map(|f| f.time).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockHttpClient;

    const API: &str = "https://api.rainviewer.com";

    #[tokio::test]
    async fn test_latest_timestamp_array_shape() {
        let mock = MockHttpClient::new()
            .route("maps.json", br#"[1700000000, 1700000600, 1700001200]"#.to_vec());
        let ts = latest_timestamp(&mock, API).await.unwrap();
        assert_eq!(ts, 1700001200);
    }

    #[tokio::test]
    async fn test_latest_timestamp_object_shape() {
        let body = br#"{"radar": [{"time": 1700000000}, {"time": 1700000600}]}"#.to_vec();
        let mock = MockHttpClient::new().route("maps.json", body);
        let ts = latest_timestamp(&mock, API).await.unwrap();
        assert_eq!(ts, 1700000600);
    }

    #[tokio::test]
    async fn test_latest_timestamp_empty_array_is_empty_error() {
        let mock = MockHttpClient::new().route("maps.json", b"[]".to_vec());
        assert!(matches!(
            latest_timestamp(&mock, API).await,
            Err(MetadataError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_latest_timestamp_http_failure_propagates() {
        let mock = MockHttpClient::new();
        assert!(matches!(
            latest_timestamp(&mock, API).await,
            Err(MetadataError::Http(_))
        ));
    }

    #[tokio::test]
    async fn test_latest_timestamp_malformed_json() {
        let mock = MockHttpClient::new().route("maps.json", b"not json".to_vec());
        assert!(matches!(
            latest_timestamp(&mock, API).await,
            Err(MetadataError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_timeline_parses_past_and_nowcast() {
        let body = br#"{"radar": {"past": [{"time": 100}, {"time": 200}], "nowcast": [{"time": 300}]}}"#
            .to_vec();
        let mock = MockHttpClient::new().route("weather-maps.json", body);
        let tl = timeline(&mock, API).await.unwrap();
        assert_eq!(tl.past, vec![100, 200]);
        assert_eq!(tl.nowcast, vec![300]);
    }

    #[tokio::test]
    async fn test_timeline_missing_nowcast_defaults_empty() {
        let body = br#"{"radar": {"past": [{"time": 100}]}}"#.to_vec();
        let mock = MockHttpClient::new().route("weather-maps.json", body);
        let tl = timeline(&mock, API).await.unwrap();
        assert_eq!(tl.past, vec![100]);
        assert!(tl.nowcast.is_empty());
    }

    #[test]
    fn test_timeline_merged_sorts_ascending() {
        let tl = Timeline {
            past: vec![300, 100],
            nowcast: vec![200],
        };
        assert_eq!(tl.merged(), vec![100, 200, 300]);
    }
}
