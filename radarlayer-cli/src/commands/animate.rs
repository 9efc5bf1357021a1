//! `animate` subcommand: an animated radar sequence to a frame directory.

use std::path::PathBuf;

use clap::Args;
use radarlayer::{AnimationRequest, GeoPoint, RadarConfig, RadarService, Viewport};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::CommandResult;

#[derive(Args)]
pub struct AnimateArgs {
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
    #[arg(long, default_value_t = 7)]
    pub zoom: u8,

    /// Backward window in minutes.
    #[arg(long, default_value_t = 60)]
    pub past_minutes: u32,

    /// Forward (nowcast) window in minutes.
    #[arg(long, default_value_t = 120)]
    pub future_minutes: u32,

    /// Radar overlay opacity, 0..=1.
    #[arg(long, default_value_t = 0.7)]
    pub alpha: f32,

    /// Output directory for the frame PNGs.
    #[arg(long, default_value = "radar-frames")]
    pub out_dir: PathBuf,
}

pub async fn animate(args: AnimateArgs, cancel: &CancellationToken) -> CommandResult {
    let service = RadarService::new(RadarConfig::default())?;
    let request = AnimationRequest::new(
        GeoPoint::new(args.lat, args.lon),
        Viewport::new(args.width, args.height, args.zoom),
    )
    .with_window(args.past_minutes, args.future_minutes)
    .with_overlay_alpha(args.alpha);

    let frames = service.get_animated(&request, cancel).await?;
    std::fs::create_dir_all(&args.out_dir)?;

    for (index, frame) in frames.iter().enumerate() {
        let tag = if frame.is_past { "past" } else { "forecast" };
        let path = args
            .out_dir
            .join(format!("frame-{:03}-{}-{}.png", index, frame.timestamp, tag));
        frame.image.save(&path)?;
        println!("{}", path.display());
    }

    info!(frames = frames.len(), dir = %args.out_dir.display(), "sequence written");
    Ok(())
}
