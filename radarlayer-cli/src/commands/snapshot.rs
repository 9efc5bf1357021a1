//! `snapshot` subcommand: one static composite to a PNG file.

use std::path::PathBuf;

use clap::Args;
use radarlayer::{GeoPoint, RadarConfig, RadarService, StaticRequest, Viewport};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::CommandResult;

#[derive(Args)]
pub struct SnapshotArgs {
    /// Latitude of the viewport center, degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude of the viewport center, degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Output width in pixels.
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// Slippy-map zoom level.
    #[arg(long, default_value_t = 6)]
    pub zoom: u8,

    /// Cache TTL in minutes.
    #[arg(long, default_value_t = 3)]
    pub ttl_minutes: u32,

    /// Radar overlay opacity, 0..=1.
    #[arg(long, default_value_t = 0.7)]
    pub alpha: f32,

    /// Output file.
    #[arg(long, default_value = "radar.png")]
    pub out: PathBuf,
}

pub async fn snapshot(args: SnapshotArgs, cancel: &CancellationToken) -> CommandResult {
    let service = RadarService::new(RadarConfig::default())?;
    let request = StaticRequest::new(
        GeoPoint::new(args.lat, args.lon),
        Viewport::new(args.width, args.height, args.zoom),
    )
    .with_ttl_minutes(args.ttl_minutes)
    .with_overlay_alpha(args.alpha);

    let image = service.get_static(&request, cancel).await?;
    image.save(&args.out)?;
    info!(path = %args.out.display(), "composite written");
    println!("{}", args.out.display());
    Ok(())
}
