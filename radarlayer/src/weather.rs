//! Open-Meteo forecast client.
//!
//! Fetches current conditions and the short daily forecast the surrounding
//! application shows next to the radar view, plus the WMO weather-code
//! mapping used for labels and glyphs. Goes through the same
//! [`AsyncHttpClient`] seam as the tile engine so HTTP-status handling
//! (notably 429 rate limiting) stays visible to the caller.

use serde::Deserialize;
use thiserror::Error;

use crate::provider::{AsyncHttpClient, HttpError};

/// Default Open-Meteo API root.
pub const DEFAULT_FORECAST_API: &str = "https://api.open-meteo.com";

/// Errors from forecast retrieval.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The HTTP request failed; inspect [`HttpError::status`] for 429.
    #[error("forecast request failed: {0}")]
    Http(#[from] HttpError),

    /// The payload was not the expected JSON shape.
    #[error("malformed forecast payload: {0}")]
    Parse(String),

    /// The payload parsed but the requested block was absent.
    #[error("forecast response missing {0} block")]
    Missing(&'static str),
}

/// Current conditions as reported by Open-Meteo.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentWeather {
    /// Air temperature at 2 m, degrees Celsius.
    pub temperature_2m: f64,
    /// Apparent ("feels like") temperature, degrees Celsius.
    pub apparent_temperature: f64,
    /// WMO weather code.
    pub weather_code: i32,
    /// Wind speed at 10 m, meters per second.
    pub wind_speed_10m: f64,
    /// Wind direction at 10 m, degrees.
    pub wind_direction_10m: f64,
}

/// One day of the daily forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecastDay {
    /// ISO date, as reported.
    pub date: String,
    /// WMO weather code.
    pub weather_code: i32,
    /// Daily maximum temperature, degrees Celsius.
    pub t_max: f64,
    /// Daily minimum temperature, degrees Celsius.
    pub t_min: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastWire {
    current: Option<CurrentWeather>,
    daily: Option<DailyWire>,
}

#[derive(Debug, Default, Deserialize)]
struct DailyWire {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    weather_code: Vec<i32>,
    #[serde(default)]
    temperature_2m_max: Vec<f64>,
    #[serde(default)]
    temperature_2m_min: Vec<f64>,
}

/// Open-Meteo client over an injected HTTP client.
pub struct ForecastClient<C> {
    http: C,
    base_url: String,
}

impl<C: AsyncHttpClient> ForecastClient<C> {
    /// Creates a client against the public Open-Meteo API.
    pub fn new(http: C) -> Self {
        Self::with_base_url(http, DEFAULT_FORECAST_API)
    }

    /// Creates a client against a custom API root.
    pub fn with_base_url(http: C, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetches current conditions for a point.
    pub async fn current(&self, lat: f64, lon: f64) -> Result<CurrentWeather, WeatherError> {
        let url = format!(
            "{}/v1/forecast?latitude={}&longitude={}&current=temperature_2m,weather_code,wind_speed_10m,wind_direction_10m,apparent_temperature&wind_speed_unit=ms&timezone=auto",
            self.base_url, lat, lon
        );
        let wire = self.fetch(&url).await?;
        wire.current.ok_or(WeatherError::Missing("current"))
    }

    /// Fetches the daily forecast; `days` is clamped to 1..=10.
    pub async fn daily(
        &self,
        lat: f64,
        lon: f64,
        days: u8,
    ) -> Result<Vec<DailyForecastDay>, WeatherError> {
        let days = days.clamp(1, 10);
        let url = format!(
            "{}/v1/forecast?latitude={}&longitude={}&daily=weather_code,temperature_2m_max,temperature_2m_min&forecast_days={}&timezone=auto",
            self.base_url, lat, lon, days
        );
        let wire = self.fetch(&url).await?;
        let daily = wire.daily.unwrap_or_default();

        // Arrays come back parallel; trust only their common prefix.
        let n = daily
            .time
            .len()
            .min(daily.weather_code.len())
            .min(daily.temperature_2m_max.len())
            .min(daily.temperature_2m_min.len())
            .min(usize::from(days));

        Ok((0..n)
            .map(|i| DailyForecastDay {
                date: daily.time[i].clone(),
                weather_code: daily.weather_code[i],
                t_max: daily.temperature_2m_max[i],
                t_min: daily.temperature_2m_min[i],
            })
            .collect())
    }

    async fn fetch(&self, url: &str) -> Result<ForecastWire, WeatherError> {
        let body = self.http.get(url).await?;
        serde_json::from_slice(&body).map_err(|e| WeatherError::Parse(e.to_string()))
    }
}

/// Short English description for a WMO weather code.
pub fn describe(code: i32) -> &'static str {
    match code {
        0 => "Clear",
        1 => "Mostly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45..=48 => "Fog",
        51..=57 => "Drizzle",
        61..=65 => "Rain",
        66..=67 => "Freezing rain",
        71..=77 => "Snow",
        80..=82 => "Showers",
        85..=86 => "Snow showers",
        95..=99 => "Thunderstorm",
        _ => "Weather",
    }
}

/// Glyph for a WMO weather code, suitable for compact labels.
pub fn glyph(code: i32) -> &'static str {
    match code {
        0 => "☀",
        1 => "🌤",
        2 => "⛅",
        3 => "☁",
        45..=48 => "🌫",
        61..=65 => "🌧",
        51..=60 | 66..=67 => "☔",
        71..=77 => "❄",
        80..=82 => "🌦",
        85..=86 => "🌨",
        95..=99 => "⛈",
        _ => "·",
    }
}
