//! Batch tile fetching.
//!
//! Pulls every tile of a [`TileRange`] for one layer with bounded
//! parallelism, decoding PNG bytes into [`RgbaImage`]s. The policy is
//! best-effort: a failed tile (404, timeout, transport, or decode error)
//! is logged and its cell stays un-drawn, because radar and basemap servers
//! routinely omit edge tiles and a whole-composite abort would make the
//! feature unusable near coverage boundaries.
//!
//! Cancellation is the one exception: it aborts the entire batch so no
//! partial composite can reach the cache.

use futures::stream::{self, StreamExt};
use image::RgbaImage;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::coord::TileRange;
use crate::provider::{AsyncHttpClient, HttpError};

/// Failure to retrieve or decode one tile. Never fatal to a batch.
#[derive(Debug, Error)]
pub enum TileError {
    /// The server has no tile at this address (404 and friends).
    #[error("tile not found: {0}")]
    NotFound(String),

    /// Transport-level failure.
    #[error("tile fetch failed: {0}")]
    Network(String),

    /// The per-request timeout elapsed.
    #[error("tile fetch timed out: {0}")]
    Timeout(String),

    /// The payload was not a decodable image.
    #[error("tile decode failed for {url}: {reason}")]
    Decode {
        /// The tile URL.
        url: String,
        /// Decoder message.
        reason: String,
    },
}

impl From<HttpError> for TileError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Status { status: 404, url } => TileError::NotFound(url),
            HttpError::Status { status, url } => {
                TileError::Network(format!("HTTP {} from {}", status, url))
            }
            HttpError::Timeout(url) => TileError::Timeout(url),
            HttpError::Transport(msg) | HttpError::Setup(msg) => TileError::Network(msg),
        }
    }
}

/// The batch was abandoned because the operation was cancelled.
#[derive(Debug, Error)]
#[error("tile batch cancelled")]
pub struct FetchAborted;

/// One successfully fetched tile, carrying its address so placement is
/// independent of arrival order.
pub struct FetchedTile {
    /// Tile column.
    pub x: i32,
    /// Tile row.
    pub y: i32,
    /// Decoded raster, 256x256 for conforming servers.
    pub image: RgbaImage,
}

/// Fetches every tile of `range`, building URLs with `url_for`.
///
/// At most `max_in_flight` requests run concurrently. Failed tiles are
/// dropped from the result after a `debug!` log; the caller composites
/// whatever arrived. Returns `Err(FetchAborted)` as soon as `cancel` fires.
pub async fn fetch_layer<C, F>(
    client: &C,
    range: &TileRange,
    url_for: F,
    max_in_flight: usize,
    cancel: &CancellationToken,
) -> Result<Vec<FetchedTile>, FetchAborted>
where
    C: AsyncHttpClient,
    F: Fn(i32, i32) -> String,
{
    let results: Vec<Option<(i32, i32, Result<RgbaImage, TileError>)>> =
        stream::iter(range.tiles())
            .map(|(x, y)| {
                let url = url_for(x, y);
                async move {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        tile = fetch_one(client, &url) => Some((x, y, tile)),
                    }
                }
            })
            .buffer_unordered(max_in_flight.max(1))
            .collect()
            .await;

    let mut tiles = Vec::with_capacity(results.len());
    for item in results {
        match item {
            None => return Err(FetchAborted),
            Some((x, y, Ok(image))) => tiles.push(FetchedTile { x, y, image }),
            Some((x, y, Err(e))) => {
                debug!(tile_x = x, tile_y = y, error = %e, "skipping unavailable tile");
            }
        }
    }
    Ok(tiles)
}

async fn fetch_one<C: AsyncHttpClient>(client: &C, url: &str) -> Result<RgbaImage, TileError> {
    let bytes = client.get(url).await?;
    let decoded = image::load_from_memory(&bytes).map_err(|e| TileError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(decoded.to_rgba8())
}
