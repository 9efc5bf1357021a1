//! Minimal raster-canvas capability set over [`RgbaImage`].
//!
//! The compositor needs exactly four drawing operations: fill the
//! background, blit a tile opaque, blit a tile with a scalar alpha, and the
//! two annotation overlays (caption bar, highlight border) used by animated
//! frames. Keeping the set this small makes the drawing backend trivially
//! replaceable.

use ab_glyph::{FontArc, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

/// Background color for uncovered cells.
pub const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Height of the caption bar in pixels.
pub const CAPTION_BAR_HEIGHT: u32 = 20;

/// Border color marking the "now" frame.
pub const HIGHLIGHT_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// Caption bar fill: translucent black, blended over the map.
const CAPTION_BAR_FILL: Rgba<u8> = Rgba([0, 0, 0, 140]);

/// Caption text color.
const CAPTION_TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Caption text size in pixels.
const CAPTION_TEXT_SCALE: f32 = 13.0;

/// Left margin of the caption text.
const CAPTION_TEXT_MARGIN: i32 = 6;

/// A drawing surface for one composite.
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Allocates a `width` x `height` canvas cleared to [`BACKGROUND`].
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, BACKGROUND),
        }
    }

    /// Wraps an existing bitmap, e.g. a cloned base map about to receive a
    /// per-frame overlay.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Canvas width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Consumes the canvas, returning the bitmap.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Draws `tile` with its top-left at `(dest_x, dest_y)`, honoring the
    /// source's own alpha only. Destinations may be negative or overhang;
    /// the blit clips to the canvas.
    pub fn blit_opaque(&mut self, tile: &RgbaImage, dest_x: i64, dest_y: i64) {
        self.blit_with_alpha(tile, dest_x, dest_y, 1.0);
    }

    /// Draws `tile` at `(dest_x, dest_y)` with `alpha` multiplied into each
    /// source pixel's alpha at blit time. Source pixels are never modified.
    pub fn blit_with_alpha(&mut self, tile: &RgbaImage, dest_x: i64, dest_y: i64, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        let cw = i64::from(self.image.width());
        let ch = i64::from(self.image.height());

        let x0 = dest_x.max(0);
        let y0 = dest_y.max(0);
        let x1 = (dest_x + i64::from(tile.width())).min(cw);
        let y1 = (dest_y + i64::from(tile.height())).min(ch);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        for y in y0..y1 {
            for x in x0..x1 {
                let src = tile.get_pixel((x - dest_x) as u32, (y - dest_y) as u32);
                let dst = self.image.get_pixel_mut(x as u32, y as u32);
                blend_over(dst, src, alpha);
            }
        }
    }

    /// Draws the semi-transparent caption bar along the bottom edge with
    /// `text` left-aligned and vertically centered. Without a font the bar
    /// is drawn empty.
    pub fn caption_bar(&mut self, text: &str, font: Option<&FontArc>) {
        let height = self.image.height();
        let width = self.image.width();
        if height < CAPTION_BAR_HEIGHT || width == 0 {
            return;
        }

        let bar_top = height - CAPTION_BAR_HEIGHT;
        for y in bar_top..height {
            for x in 0..width {
                let dst = self.image.get_pixel_mut(x, y);
                blend_over(dst, &CAPTION_BAR_FILL, 1.0);
            }
        }

        if let Some(font) = font {
            let scale = PxScale::from(CAPTION_TEXT_SCALE);
            let text_y =
                bar_top as i32 + (CAPTION_BAR_HEIGHT as i32 - CAPTION_TEXT_SCALE as i32) / 2;
            draw_text_mut(
                &mut self.image,
                CAPTION_TEXT_COLOR,
                CAPTION_TEXT_MARGIN,
                text_y,
                scale,
                font,
                text,
            );
        }
    }

    /// Draws the bright 2 px border marking the current frame, inset one
    /// pixel from the canvas edge.
    pub fn highlight_border(&mut self) {
        let width = self.image.width();
        let height = self.image.height();
        if width < 6 || height < 6 {
            return;
        }

        for inset in 1..=2u32 {
            draw_hollow_rect_mut(
                &mut self.image,
                Rect::at(inset as i32, inset as i32)
                    .of_size(width - 2 * inset - 1, height - 2 * inset - 1),
                HIGHLIGHT_COLOR,
            );
        }
    }

    /// Fills a solid rectangle; exposed for marker overlays.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba<u8>) {
        draw_filled_rect_mut(&mut self.image, Rect::at(x, y).of_size(width, height), color);
    }
}

/// Standard straight-alpha "over" blend with a scalar multiplier on the
/// source alpha.
fn blend_over(dst: &mut Rgba<u8>, src: &Rgba<u8>, alpha: f32) {
    let a = f32::from(src[3]) / 255.0 * alpha;
    if a <= 0.0 {
        return;
    }
    for c in 0..3 {
        let s = f32::from(src[c]);
        let d = f32::from(dst[c]);
        dst[c] = (s * a + d * (1.0 - a)).round() as u8;
    }
    let da = f32::from(dst[3]) / 255.0;
    dst[3] = ((a + da * (1.0 - a)) * 255.0).round() as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_canvas_is_background_filled() {
        let canvas = Canvas::new(8, 8);
        let img = canvas.into_image();
        assert!(img.pixels().all(|p| p == &BACKGROUND));
    }

    #[test]
    fn test_blit_opaque_replaces_pixels() {
        let mut canvas = Canvas::new(8, 8);
        let tile = RgbaImage::from_pixel(4, 4, Rgba([9, 8, 7, 255]));
        canvas.blit_opaque(&tile, 2, 2);
        let img = canvas.into_image();
        assert_eq!(img.get_pixel(2, 2), &Rgba([9, 8, 7, 255]));
        assert_eq!(img.get_pixel(5, 5), &Rgba([9, 8, 7, 255]));
        assert_eq!(img.get_pixel(1, 1), &BACKGROUND);
        assert_eq!(img.get_pixel(6, 6), &BACKGROUND);
    }

    #[test]
    fn test_blit_clips_negative_destination() {
        let mut canvas = Canvas::new(8, 8);
        let tile = RgbaImage::from_pixel(4, 4, Rgba([50, 60, 70, 255]));
        canvas.blit_opaque(&tile, -2, -2);
        let img = canvas.into_image();
        // Only the overlapping 2x2 corner lands.
        assert_eq!(img.get_pixel(0, 0), &Rgba([50, 60, 70, 255]));
        assert_eq!(img.get_pixel(1, 1), &Rgba([50, 60, 70, 255]));
        assert_eq!(img.get_pixel(2, 2), &BACKGROUND);
    }

    #[test]
    fn test_blit_clips_overhanging_destination() {
        let mut canvas = Canvas::new(8, 8);
        let tile = RgbaImage::from_pixel(4, 4, Rgba([50, 60, 70, 255]));
        canvas.blit_opaque(&tile, 6, 6);
        let img = canvas.into_image();
        assert_eq!(img.get_pixel(7, 7), &Rgba([50, 60, 70, 255]));
    }

    #[test]
    fn test_blit_fully_outside_is_noop() {
        let mut canvas = Canvas::new(8, 8);
        let tile = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        canvas.blit_opaque(&tile, 100, 100);
        canvas.blit_opaque(&tile, -100, -100);
        let img = canvas.into_image();
        assert!(img.pixels().all(|p| p == &BACKGROUND));
    }

    #[test]
    fn test_blit_with_alpha_halves_opaque_source() {
        let mut canvas = Canvas::new(4, 4);
        let tile = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        canvas.blit_with_alpha(&tile, 0, 0, 0.5);
        let img = canvas.into_image();
        let px = img.get_pixel(0, 0);
        assert!((i32::from(px[0]) - 128).abs() <= 1);
        assert_eq!(px[1], 0);
    }

    #[test]
    fn test_blit_with_alpha_respects_source_alpha() {
        let mut canvas = Canvas::new(4, 4);
        // Half-transparent white at overlay alpha 0.5 => effective 0.25.
        let tile = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 128]));
        canvas.blit_with_alpha(&tile, 0, 0, 0.5);
        let img = canvas.into_image();
        let px = img.get_pixel(0, 0);
        assert!((i32::from(px[0]) - 64).abs() <= 2, "got {:?}", px);
    }

    #[test]
    fn test_blit_alpha_zero_is_noop() {
        let mut canvas = Canvas::new(4, 4);
        let tile = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        canvas.blit_with_alpha(&tile, 0, 0, 0.0);
        let img = canvas.into_image();
        assert!(img.pixels().all(|p| p == &BACKGROUND));
    }

    #[test]
    fn test_caption_bar_darkens_only_bottom_rows() {
        let mut canvas = Canvas::new(64, 64);
        let tile = RgbaImage::from_pixel(64, 64, Rgba([200, 200, 200, 255]));
        canvas.blit_opaque(&tile, 0, 0);
        canvas.caption_bar("12:00 · past", None);
        let img = canvas.into_image();

        let above = img.get_pixel(10, 64 - CAPTION_BAR_HEIGHT - 1);
        let inside = img.get_pixel(10, 60);
        assert_eq!(above, &Rgba([200, 200, 200, 255]));
        assert!(inside[0] < 200, "bar should darken, got {:?}", inside);
    }

    #[test]
    fn test_caption_bar_too_small_canvas_is_noop() {
        let mut canvas = Canvas::new(16, 10);
        canvas.caption_bar("x", None);
        let img = canvas.into_image();
        assert!(img.pixels().all(|p| p == &BACKGROUND));
    }

    #[test]
    fn test_highlight_border_marks_inset_ring() {
        let mut canvas = Canvas::new(32, 32);
        canvas.highlight_border();
        let img = canvas.into_image();
        assert_eq!(img.get_pixel(1, 1), &HIGHLIGHT_COLOR);
        assert_eq!(img.get_pixel(2, 2), &HIGHLIGHT_COLOR);
        assert_eq!(img.get_pixel(0, 0), &BACKGROUND);
        assert_eq!(img.get_pixel(16, 16), &BACKGROUND);
    }

    #[test]
    fn test_fill_rect() {
        let mut canvas = Canvas::new(16, 16);
        canvas.fill_rect(4, 4, 2, 2, Rgba([1, 2, 3, 255]));
        let img = canvas.into_image();
        assert_eq!(img.get_pixel(4, 4), &Rgba([1, 2, 3, 255]));
        assert_eq!(img.get_pixel(6, 6), &BACKGROUND);
    }
}
