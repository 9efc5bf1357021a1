//! Tile compositing.
//!
//! Turns a set of fetched tiles into one viewport-sized raster. Layers are
//! drawn in two deterministic passes: the complete base layer opaque, then
//! the complete radar layer with a scalar alpha folded into each source
//! pixel's own alpha at blit time. Missing tiles simply leave their
//! destination rectangle unfilled for that layer, so the composite stays
//! usable near coverage boundaries.

mod canvas;

pub use canvas::{Canvas, BACKGROUND, CAPTION_BAR_HEIGHT, HIGHLIGHT_COLOR};

use image::RgbaImage;

use crate::coord::{TileRange, Viewport};
use crate::fetch::FetchedTile;

/// Composites base and radar tile sets into a fresh bitmap.
pub fn compose_layers(
    base: &[FetchedTile],
    radar: &[FetchedTile],
    range: &TileRange,
    viewport: &Viewport,
    overlay_alpha: f32,
) -> RgbaImage {
    let mut canvas = Canvas::new(viewport.width, viewport.height);
    blit_base_layer(&mut canvas, base, range);
    overlay_radar_layer(&mut canvas, radar, range, overlay_alpha);
    canvas.into_image()
}

/// Draws every base tile opaque at its computed destination.
pub fn blit_base_layer(canvas: &mut Canvas, tiles: &[FetchedTile], range: &TileRange) {
    for tile in tiles {
        let (dx, dy) = range.dest(tile.x, tile.y);
        canvas.blit_opaque(&tile.image, dx, dy);
    }
}

/// Draws every radar tile with the overlay alpha at its destination.
///
/// Also used by the animation path to stamp per-frame overlays onto clones
/// of a shared base map.
pub fn overlay_radar_layer(
    canvas: &mut Canvas,
    tiles: &[FetchedTile],
    range: &TileRange,
    overlay_alpha: f32,
) {
    for tile in tiles {
        let (dx, dy) = range.dest(tile.x, tile.y);
        canvas.blit_with_alpha(&tile.image, dx, dy, overlay_alpha);
    }
}
