// The persistent ink layer.
// Visual: everything you have drawn lives here; each frame it is laid over
// the live camera image wherever it holds ink (see `composite_onto`).
// Black is "no ink": the eraser simply paints black.

use crate::error::{Error, Result};
use crate::gamma::GammaLut;
use crate::types::{pack_rgb, FrameBuffer, Point, Rect, Rgb};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

pub const BACKGROUND: Rgb = [0, 0, 0];

/// Luma above which a canvas pixel counts as ink when compositing.
pub const INK_THRESHOLD: f32 = 10.0;

pub struct Canvas {
    img: RgbImage,
    lut: GammaLut,
}

impl Canvas {
    /// Blank canvas; the size is fixed for its whole life.
    pub fn new(width: u32, height: u32) -> Self {
        Self { img: RgbImage::new(width, height), lut: GammaLut::new() }
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.img.dimensions()
    }

    pub fn image(&self) -> &RgbImage {
        &self.img
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        self.img.get_pixel(x, y).0
    }

    /// No ink anywhere.
    pub fn is_empty(&self) -> bool {
        self.img.as_raw().iter().all(|b| *b == 0)
    }

    pub fn clear(&mut self) {
        for px in self.img.pixels_mut() {
            *px = image::Rgb(BACKGROUND);
        }
    }

    /// Clamp a point into the canvas (onto the origin when it has no pixels).
    pub fn clamp(&self, x: i32, y: i32) -> Point {
        let max_x = (self.width() as i32 - 1).max(0);
        let max_y = (self.height() as i32 - 1).max(0);
        Point::new(x.clamp(0, max_x), y.clamp(0, max_y))
    }

    /// Independent copy for the undo history.
    pub fn snapshot(&self) -> RgbImage {
        self.img.clone()
    }

    /// Swap in a stored snapshot. Must match the canvas size.
    pub fn restore(&mut self, snapshot: RgbImage) -> Result<()> {
        if snapshot.dimensions() != self.dimensions() {
            return Err(Error::DimensionMismatch { expected: self.dimensions(), found: snapshot.dimensions() });
        }
        self.img = snapshot;
        Ok(())
    }

    /// Clip a rect to the canvas; `None` if nothing is left.
    fn clip(&self, r: Rect) -> Option<Rect> {
        let clipped = Rect {
            x0: r.x0.max(0),
            y0: r.y0.max(0),
            x1: r.x1.min(self.width() as i32),
            y1: r.y1.min(self.height() as i32),
        };
        (clipped.x0 < clipped.x1 && clipped.y0 < clipped.y1).then_some(clipped)
    }

    /// Hard-edged filled disc. Returns the touched area.
    /// Visual: the dot left by a single tap.
    pub fn fill_circle(&mut self, c: Point, radius: i32, color: Rgb) -> Option<Rect> {
        let r = radius.max(0);
        let area = self.clip(Rect { x0: c.x - r, y0: c.y - r, x1: c.x + r + 1, y1: c.y + r + 1 })?;
        let r2 = r * r;
        for y in area.y0..area.y1 {
            for x in area.x0..area.x1 {
                let (dx, dy) = (x - c.x, y - c.y);
                if dx * dx + dy * dy <= r2 {
                    self.img.put_pixel(x as u32, y as u32, image::Rgb(color));
                }
            }
        }
        Some(area)
    }

    /// Anti-aliased segment `thickness` pixels wide with round caps.
    /// Each pixel's coverage comes from its distance to the segment and is
    /// blended in linear light. Returns the touched area.
    pub fn draw_segment(&mut self, a: Point, b: Point, thickness: u32, color: Rgb) -> Option<Rect> {
        let half = thickness.max(1) as f32 / 2.0;
        let pad = half.ceil() as i32 + 1;
        let area = self.clip(Rect {
            x0: a.x.min(b.x) - pad,
            y0: a.y.min(b.y) - pad,
            x1: a.x.max(b.x) + pad + 1,
            y1: a.y.max(b.y) + pad + 1,
        })?;

        let (ax, ay) = (a.x as f32, a.y as f32);
        let (dx, dy) = ((b.x - a.x) as f32, (b.y - a.y) as f32);
        let len2 = dx * dx + dy * dy;

        for y in area.y0..area.y1 {
            for x in area.x0..area.x1 {
                let (px, py) = (x as f32 - ax, y as f32 - ay);
                // Closest point on the segment, as a fraction along it.
                let t = if len2 > 0.0 { ((px * dx + py * dy) / len2).clamp(0.0, 1.0) } else { 0.0 };
                let d = (px - t * dx).hypot(py - t * dy);
                let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let px = self.img.get_pixel_mut(x as u32, y as u32);
                px.0 = self.lut.mix(px.0, color, coverage);
            }
        }
        Some(area)
    }

    /// Bounding box of all ink, or `None` on a blank canvas.
    pub fn content_bounds(&self) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        for (x, y, px) in self.img.enumerate_pixels() {
            if px.0 != BACKGROUND {
                let (x, y) = (x as i32, y as i32);
                let cell = Rect { x0: x, y0: y, x1: x + 1, y1: y + 1 };
                bounds = Some(bounds.map_or(cell, |b| b.union(cell)));
            }
        }
        bounds
    }

    /// Copy of just the inked area (the whole canvas when blank).
    pub fn crop_to_content(&self) -> RgbImage {
        match self.content_bounds() {
            Some(r) => image::imageops::crop_imm(&self.img, r.x0 as u32, r.y0 as u32, r.width() as u32, r.height() as u32)
                .to_image(),
            None => self.img.clone(),
        }
    }

    /// PNG bytes of the raw canvas.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        self.img.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    /// Decode an image that must match this canvas exactly in size.
    /// Does not touch the canvas; the caller decides when to swap it in.
    pub fn decode_matching(&self, bytes: &[u8]) -> Result<RgbImage> {
        let decoded = image::load_from_memory(bytes)?.to_rgb8();
        if decoded.dimensions() != self.dimensions() {
            return Err(Error::DimensionMismatch { expected: self.dimensions(), found: decoded.dimensions() });
        }
        Ok(decoded)
    }

    /// Lay the ink over a camera frame: inked pixels replace the frame pixel.
    /// Visual: your drawing appears on top of the live video.
    pub fn composite_onto(&self, frame: &mut FrameBuffer) {
        let w = frame.width.min(self.width() as usize);
        let h = frame.height.min(self.height() as usize);
        for y in 0..h {
            let row = y * frame.width;
            for x in 0..w {
                let c = self.img.get_pixel(x as u32, y as u32).0;
                let luma = 0.299 * c[0] as f32 + 0.587 * c[1] as f32 + 0.114 * c[2] as f32;
                if luma > INK_THRESHOLD {
                    frame.pixels[row + x] = pack_rgb(c);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = [255, 0, 0];

    #[test]
    fn test_new_canvas_is_blank() {
        let c = Canvas::new(64, 48);
        assert_eq!(c.dimensions(), (64, 48));
        assert!(c.is_empty());
        assert_eq!(c.content_bounds(), None);
    }

    #[test]
    fn test_fill_circle_radius() {
        let mut c = Canvas::new(40, 40);
        let area = c.fill_circle(Point::new(10, 10), 4, RED).unwrap();
        assert_eq!(area, Rect { x0: 6, y0: 6, x1: 15, y1: 15 });
        assert_eq!(c.pixel(10, 10), RED);
        assert_eq!(c.pixel(14, 10), RED);
        assert_eq!(c.pixel(10, 6), RED);
        assert_eq!(c.pixel(15, 10), BACKGROUND);
        assert_eq!(c.pixel(13, 13), BACKGROUND);
    }

    #[test]
    fn test_circle_clipped_at_edge() {
        let mut c = Canvas::new(20, 20);
        let area = c.fill_circle(Point::new(0, 0), 5, RED).unwrap();
        assert_eq!(area, Rect { x0: 0, y0: 0, x1: 6, y1: 6 });
        assert_eq!(c.pixel(0, 0), RED);
    }

    #[test]
    fn test_segment_covers_line_and_not_far_pixels() {
        let mut c = Canvas::new(100, 40);
        c.draw_segment(Point::new(10, 20), Point::new(90, 20), 6, RED);
        for x in 10..=90 {
            assert_eq!(c.pixel(x, 20), RED);
            assert_eq!(c.pixel(x, 22), RED);
        }
        assert_eq!(c.pixel(50, 30), BACKGROUND);
        assert_eq!(c.pixel(50, 10), BACKGROUND);
        // Edge rows are partially covered: some red, not full.
        let edge = c.pixel(50, 23);
        assert!(edge[0] > 0 && edge[0] < 255 || edge == RED);
    }

    #[test]
    fn test_segment_is_deterministic() {
        let mut a = Canvas::new(50, 50);
        let mut b = Canvas::new(50, 50);
        for c in [&mut a, &mut b] {
            c.draw_segment(Point::new(3, 7), Point::new(41, 33), 5, [10, 200, 90]);
        }
        assert_eq!(a.image().as_raw(), b.image().as_raw());
    }

    #[test]
    fn test_content_bounds_and_crop() {
        let mut c = Canvas::new(50, 50);
        c.fill_circle(Point::new(20, 30), 2, RED);
        let r = c.content_bounds().unwrap();
        assert_eq!(r, Rect { x0: 18, y0: 28, x1: 23, y1: 33 });
        assert_eq!(c.crop_to_content().dimensions(), (5, 5));
    }

    #[test]
    fn test_clamp_on_empty_canvas() {
        let c = Canvas::new(0, 0);
        assert_eq!(c.clamp(5, -3), Point::new(0, 0));
        let c = Canvas::new(10, 4);
        assert_eq!(c.clamp(50, -3), Point::new(9, 0));
    }

    #[test]
    fn test_restore_rejects_wrong_size() {
        let mut c = Canvas::new(10, 10);
        let err = c.restore(RgbImage::new(5, 5)).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn test_png_roundtrip_and_mismatch() {
        let mut c = Canvas::new(16, 12);
        c.fill_circle(Point::new(8, 6), 3, RED);
        let bytes = c.encode_png().unwrap();

        let other = Canvas::new(16, 12);
        let decoded = other.decode_matching(&bytes).unwrap();
        assert_eq!(decoded.as_raw(), c.image().as_raw());

        let small = Canvas::new(8, 8);
        assert!(matches!(small.decode_matching(&bytes), Err(Error::DimensionMismatch { .. })));
        assert!(matches!(small.decode_matching(b"not a png"), Err(Error::Image(_))));
    }

    #[test]
    fn test_composite_only_ink() {
        let mut c = Canvas::new(4, 1);
        c.fill_circle(Point::new(0, 0), 0, RED);
        c.fill_circle(Point::new(1, 0), 0, [3, 3, 3]); // below the ink threshold
        let mut frame = FrameBuffer::filled(4, 1, 0x00_11_22_33);
        c.composite_onto(&mut frame);
        assert_eq!(frame.pixels, vec![0x00_FF_00_00, 0x00_11_22_33, 0x00_11_22_33, 0x00_11_22_33]);
    }
}
