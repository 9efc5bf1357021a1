//! `weather` and `locate` subcommands over the supplemental clients.

use clap::Args;
use radarlayer::config::RadarConfig;
use radarlayer::geo::{locate_by_ip, GeocodingClient};
use radarlayer::provider::ReqwestClient;
use radarlayer::weather::{describe, glyph, ForecastClient};

use super::CommandResult;

#[derive(Args)]
pub struct WeatherArgs {
    /// Latitude, degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude, degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Forecast days to print (1..=10).
    #[arg(long, default_value_t = 6)]
    pub days: u8,
}

fn http_client() -> Result<ReqwestClient, radarlayer::provider::HttpError> {
    let config = RadarConfig::default();
    ReqwestClient::new(config.request_timeout, &config.user_agent)
}

pub async fn weather(args: WeatherArgs) -> CommandResult {
    let client = ForecastClient::new(http_client()?);

    let current = client.current(args.lat, args.lon).await?;
    println!(
        "{} {}  {:.1}°C (feels {:.1}°C)  wind {:.1} m/s @ {:.0}°",
        glyph(current.weather_code),
        describe(current.weather_code),
        current.temperature_2m,
        current.apparent_temperature,
        current.wind_speed_10m,
        current.wind_direction_10m,
    );

    for day in client.daily(args.lat, args.lon, args.days).await? {
        println!(
            "{}  {} {}  {:.0}°/{:.0}°",
            day.date,
            glyph(day.weather_code),
            describe(day.weather_code),
            day.t_max,
            day.t_min,
        );
    }
    Ok(())
}

pub async fn locate() -> CommandResult {
    let client = http_client()?;
    let location = locate_by_ip(&client).await?;

    let label = match location.display_name() {
        Some(name) => name,
        // The IP providers sometimes omit place names; ask the geocoder.
        None => GeocodingClient::new(client)
            .reverse(location.latitude, location.longitude, "en")
            .await?
            .unwrap_or_else(|| "unknown location".to_string()),
    };

    println!(
        "{:.4}, {:.4}  ({})",
        location.latitude, location.longitude, label
    );
    Ok(())
}
