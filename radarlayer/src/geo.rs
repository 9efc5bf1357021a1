//! Location services.
//!
//! Two concerns the surrounding application needs next to the radar view:
//! a best-effort IP-based position fix (with an ordered fallback across
//! free providers, since each rate-limits aggressively) and Open-Meteo
//! forward/reverse geocoding for the location picker.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::provider::{AsyncHttpClient, HttpError};

/// Default Open-Meteo geocoding API root.
pub const DEFAULT_GEOCODING_API: &str = "https://geocoding-api.open-meteo.com";

/// IP geolocation providers, tried in order.
const IP_PROVIDERS: [&str; 3] = [
    "https://ipapi.co/json/",
    "https://ipwho.is/",
    "https://ipinfo.io/json",
];

/// Errors from location lookups.
#[derive(Debug, Error)]
pub enum GeoError {
    /// The HTTP request failed.
    #[error("location request failed: {0}")]
    Http(#[from] HttpError),

    /// The payload was not the expected JSON shape.
    #[error("malformed location payload: {0}")]
    Parse(String),

    /// Every IP geolocation provider failed or answered garbage.
    #[error("all IP geolocation providers failed")]
    ProvidersExhausted,
}

/// A resolved geographic location.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLocation {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// City name, when the provider reports one.
    pub city: Option<String>,
    /// Country name, when the provider reports one.
    pub country: Option<String>,
}

impl GeoLocation {
    /// "City, Country" display string, degrading to whichever part exists.
    pub fn display_name(&self) -> Option<String> {
        match (self.city.as_deref(), self.country.as_deref()) {
            (Some(city), Some(country)) => Some(format!("{}, {}", city, country)),
            (Some(city), None) => Some(city.to_string()),
            (None, Some(country)) => Some(country.to_string()),
            (None, None) => None,
        }
    }
}

/// Resolves the host's position from its public IP address.
///
/// Providers are tried in order; the first parseable answer wins. A
/// rate-limited or malformed provider just advances the chain.
pub async fn locate_by_ip<C: AsyncHttpClient>(client: &C) -> Result<GeoLocation, GeoError> {
    for url in IP_PROVIDERS {
        match client.get(url).await {
            Ok(body) => {
                if let Some(location) = parse_ip_response(url, &body) {
                    return Ok(location);
                }
                debug!(provider = url, "unusable geolocation payload, trying next");
            }
            Err(e) => {
                debug!(provider = url, error = %e, "geolocation provider failed, trying next");
            }
        }
    }
    Err(GeoError::ProvidersExhausted)
}

fn parse_ip_response(url: &str, body: &[u8]) -> Option<GeoLocation> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let obj = value.as_object()?;

    if url.contains("ipinfo.io") {
        // ipinfo packs coordinates as `loc: "lat,lon"`.
        let loc = obj.get("loc")?.as_str()?;
        let (lat, lon) = loc.split_once(',')?;
        return Some(GeoLocation {
            latitude: lat.trim().parse().ok()?,
            longitude: lon.trim().parse().ok()?,
            city: string_field(obj, "city"),
            country: string_field(obj, "country"),
        });
    }

    if url.contains("ipwho.is") && obj.get("success").and_then(Value::as_bool) == Some(false) {
        return None;
    }

    let country_key = if url.contains("ipapi.co") {
        "country_name"
    } else {
        "country"
    };
    Some(GeoLocation {
        latitude: obj.get("latitude")?.as_f64()?,
        longitude: obj.get("longitude")?.as_f64()?,
        city: string_field(obj, "city"),
        country: string_field(obj, country_key),
    })
}

fn string_field(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// A geocoding search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// "Name, Country" display string.
    pub display: String,
}

/// Open-Meteo geocoding client.
pub struct GeocodingClient<C> {
    http: C,
    base_url: String,
}

impl<C: AsyncHttpClient> GeocodingClient<C> {
    /// Creates a client against the public geocoding API.
    pub fn new(http: C) -> Self {
        Self::with_base_url(http, DEFAULT_GEOCODING_API)
    }

    /// Creates a client against a custom API root.
    pub fn with_base_url(http: C, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Resolves a place name to coordinates. Returns `Ok(None)` when
    /// nothing matches.
    pub async fn search(
        &self,
        query: &str,
        language: &str,
        country_code: Option<&str>,
    ) -> Result<Option<Place>, GeoError> {
        if query.trim().is_empty() {
            return Ok(None);
        }
        let mut url = format!(
            "{}/v1/search?name={}&language={}&count=1",
            self.base_url,
            urlencode(query),
            language
        );
        if let Some(cc) = country_code {
            url.push_str("&country=");
            url.push_str(&urlencode(cc));
        }

        let body = self.http.get(&url).await?;
        let value: Value =
            serde_json::from_slice(&body).map_err(|e| GeoError::Parse(e.to_string()))?;
        let Some(first) = value
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
        else {
            return Ok(None);
        };

        let (Some(lat), Some(lon)) = (
            first.get("latitude").and_then(Value::as_f64),
            first.get("longitude").and_then(Value::as_f64),
        ) else {
            return Ok(None);
        };

        let name = first.get("name").and_then(Value::as_str);
        let country = first.get("country").and_then(Value::as_str);
        let display = match (name, country) {
            (Some(n), Some(c)) => format!("{}, {}", n, c),
            (Some(n), None) => n.to_string(),
            (None, Some(c)) => c.to_string(),
            (None, None) => query.trim().to_string(),
        };

        Ok(Some(Place {
            latitude: lat,
            longitude: lon,
            display,
        }))
    }

    /// Resolves coordinates to a "City, Country" label. Returns `Ok(None)`
    /// when the API has nothing for the point.
    pub async fn reverse(
        &self,
        lat: f64,
        lon: f64,
        language: &str,
    ) -> Result<Option<String>, GeoError> {
        let url = format!(
            "{}/v1/reverse?latitude={}&longitude={}&language={}&count=1",
            self.base_url, lat, lon, language
        );
        let body = self.http.get(&url).await?;
        let value: Value =
            serde_json::from_slice(&body).map_err(|e| GeoError::Parse(e.to_string()))?;

        let place = value
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .map(|first| GeoLocation {
                latitude: lat,
                longitude: lon,
                city: first
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                country: first
                    .get("country")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            });

        Ok(place.and_then(|p| p.display_name()))
    }
}

/// Minimal percent-encoding for query components.
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockHttpClient;

    #[tokio::test]
    async fn test_locate_first_provider_wins() {
        let body = br#"{"latitude": 49.3, "longitude": 14.1, "city": "Pisek", "country_name": "Czechia"}"#
            .to_vec();
        let mock = MockHttpClient::new().route("ipapi.co", body);
        let location = locate_by_ip(&mock).await.unwrap();
        assert_eq!(location.city.as_deref(), Some("Pisek"));
        assert_eq!(location.country.as_deref(), Some("Czechia"));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_locate_falls_back_on_failure() {
        // ipapi.co 404s (unrouted); ipwho.is declines; ipinfo answers.
        let declined = br#"{"success": false}"#.to_vec();
        let info = br#"{"loc": "49.31,14.14", "city": "Pisek", "country": "CZ"}"#.to_vec();
        let mock = MockHttpClient::new()
            .route("ipwho.is", declined)
            .route("ipinfo.io", info);
        let location = locate_by_ip(&mock).await.unwrap();
        assert!((location.latitude - 49.31).abs() < 1e-9);
        assert!((location.longitude - 14.14).abs() < 1e-9);
        assert_eq!(mock.request_count(), 3);
    }

    #[tokio::test]
    async fn test_locate_all_providers_exhausted() {
        let mock = MockHttpClient::new();
        assert!(matches!(
            locate_by_ip(&mock).await,
            Err(GeoError::ProvidersExhausted)
        ));
        assert_eq!(mock.request_count(), 3);
    }

    #[test]
    fn test_parse_ipinfo_loc_string() {
        let body = br#"{"loc": " 40.71 , -74.00 ", "city": "NYC"}"#;
        let location = parse_ip_response("https://ipinfo.io/json", body).unwrap();
        assert!((location.latitude - 40.71).abs() < 1e-9);
        assert!((location.longitude + 74.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_ipinfo_malformed_loc() {
        assert!(parse_ip_response("https://ipinfo.io/json", br#"{"loc": "garbage"}"#).is_none());
        assert!(parse_ip_response("https://ipinfo.io/json", br#"{}"#).is_none());
    }

    #[test]
    fn test_display_name_degrades() {
        let mut location = GeoLocation {
            latitude: 0.0,
            longitude: 0.0,
            city: Some("Pisek".into()),
            country: Some("Czechia".into()),
        };
        assert_eq!(location.display_name().as_deref(), Some("Pisek, Czechia"));
        location.country = None;
        assert_eq!(location.display_name().as_deref(), Some("Pisek"));
        location.city = None;
        assert_eq!(location.display_name(), None);
    }

    #[tokio::test]
    async fn test_search_builds_query_and_parses() {
        let body = br#"{"results": [{"latitude": 49.3105, "longitude": 14.1415,
            "name": "Pisek", "country": "Czechia"}]}"#
            .to_vec();
        let mock = MockHttpClient::new().route("/v1/search", body);
        let client = GeocodingClient::new(mock);
        let place = client
            .search("Pisek town", "en", Some("CZ"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(place.display, "Pisek, Czechia");
        let urls = client.http.requested_urls();
        assert!(urls[0].contains("name=Pisek%20town"));
        assert!(urls[0].contains("&country=CZ"));
    }

    #[tokio::test]
    async fn test_search_empty_query_short_circuits() {
        let client = GeocodingClient::new(MockHttpClient::new());
        assert!(client.search("  ", "en", None).await.unwrap().is_none());
        assert_eq!(client.http.request_count(), 0);
    }

    #[tokio::test]
    async fn test_reverse_formats_display() {
        let body = br#"{"results": [{"name": "Pisek", "country": "Czechia"}]}"#.to_vec();
        let mock = MockHttpClient::new().route("/v1/reverse", body);
        let client = GeocodingClient::new(mock);
        let label = client.reverse(49.3105, 14.1415, "en").await.unwrap();
        assert_eq!(label.as_deref(), Some("Pisek, Czechia"));
    }

    #[tokio::test]
    async fn test_reverse_no_results() {
        let mock = MockHttpClient::new().route("/v1/reverse", br#"{"results": []}"#.to_vec());
        let client = GeocodingClient::new(mock);
        assert!(client.reverse(0.0, 0.0, "en").await.unwrap().is_none());
    }
}
