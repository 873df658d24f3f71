//! Frame canvas backed by a `tiny-skia` pixmap.
//!
//! Strokes are anti-aliased by the pixmap rasterizer. The canvas starts fully
//! opaque and stays that way, so reading pixels back as straight RGB is exact.

use bytemuck::{Pod, Zeroable};
use tiny_skia::{
    Color, FillRule, LineCap, Mask, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform,
};

/// 8-bit RGB pixel, laid out as packed `rgb24`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    /// Half-intensity green, the plotting-library "g" shorthand.
    pub const GREEN: Rgb = Rgb::new(0, 128, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[inline]
    fn to_color(self) -> Color {
        Color::from_rgba8(self.r, self.g, self.b, 255)
    }
}

/// Axis-aligned rectangle in pixel space, `x0 <= x1`, `y0 <= y1` (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PixelRect {
    /// `None` for inverted or non-finite rectangles.
    pub fn to_rect(&self) -> Option<Rect> {
        Rect::from_ltrb(self.x0 as f32, self.y0 as f32, self.x1 as f32, self.y1 as f32)
    }
}

/// Opaque RGB image, row-major, top row first.
#[derive(Clone)]
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    /// Create a canvas filled with `color`.
    ///
    /// Returns `None` when either dimension is zero or the pixmap would be too large.
    pub fn new(width: u32, height: u32, color: Rgb) -> Option<Self> {
        let mut pixmap = Pixmap::new(width, height)?;
        pixmap.fill(color.to_color());
        Some(Self { pixmap })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Whole canvas as a rectangle.
    pub fn bounds(&self) -> PixelRect {
        PixelRect {
            x0: 0.0,
            y0: 0.0,
            x1: self.width() as f64,
            y1: self.height() as f64,
        }
    }

    /// Pixel at column `x`, row `y`, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some(Rgb::new(c.red(), c.green(), c.blue()))
    }

    /// Unpack into `rgb24` pixels, replacing the contents of `out`.
    pub fn write_rgb(&self, out: &mut Vec<Rgb>) {
        out.clear();
        out.extend(self.pixmap.pixels().iter().map(|p| {
            let c = p.demultiply();
            Rgb::new(c.red(), c.green(), c.blue())
        }));
    }

    /// Paint every pixel with `color`.
    pub fn fill(&mut self, color: Rgb) {
        self.pixmap.fill(color.to_color());
    }

    /// Overwrite this canvas with `other`, reusing the allocation when the sizes match.
    pub fn copy_from(&mut self, other: &Canvas) {
        if (self.width(), self.height()) == (other.width(), other.height()) {
            self.pixmap.data_mut().copy_from_slice(other.pixmap.data());
        } else {
            self.pixmap = other.pixmap.clone();
        }
    }

    /// Mask admitting only the pixels inside `rect`, sized to this canvas.
    pub fn clip_mask(&self, rect: PixelRect) -> Option<Mask> {
        let mut mask = Mask::new(self.width(), self.height())?;
        let path = PathBuilder::from_rect(rect.to_rect()?);
        mask.fill_path(&path, FillRule::Winding, false, Transform::identity());
        Some(mask)
    }

    /// Stroke a line of `width` pixels from `start` to `end`.
    ///
    /// With a `clip` mask only the pixels it admits are touched. Segments with
    /// non-finite endpoints are skipped.
    pub fn draw_line(
        &mut self,
        start: (f64, f64),
        end: (f64, f64),
        width: f64,
        color: Rgb,
        clip: Option<&Mask>,
    ) {
        let finite = [start.0, start.1, end.0, end.1]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return;
        }

        let mut pb = PathBuilder::new();
        pb.move_to(start.0 as f32, start.1 as f32);
        pb.line_to(end.0 as f32, end.1 as f32);
        if let Some(path) = pb.finish() {
            self.stroke(&path, width, color, clip);
        }
    }

    /// Outline `rect` with a stroke of `width` pixels centered on its edges.
    pub fn stroke_rect(&mut self, rect: PixelRect, width: f64, color: Rgb) {
        if let Some(rect) = rect.to_rect() {
            self.stroke(&PathBuilder::from_rect(rect), width, color, None);
        }
    }

    fn stroke(&mut self, path: &Path, width: f64, color: Rgb, clip: Option<&Mask>) {
        let mut paint = Paint::default();
        paint.set_color(color.to_color());
        paint.anti_alias = true;

        // Projecting caps, like plotted lines
        let stroke = Stroke {
            width: width as f32,
            line_cap: LineCap::Square,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(path, &paint, &stroke, Transform::identity(), clip);
    }
}

impl PartialEq for Canvas {
    fn eq(&self, other: &Self) -> bool {
        self.width() == other.width()
            && self.height() == other.height()
            && self.pixmap.data() == other.pixmap.data()
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn near(a: Rgb, b: Rgb) -> bool {
        let d = |x: u8, y: u8| x.abs_diff(y) <= 3;
        d(a.r, b.r) && d(a.g, b.g) && d(a.b, b.b)
    }

    #[test]
    fn test_rgb_is_packed() {
        assert_eq!(std::mem::size_of::<Rgb>(), 3);
        let canvas = Canvas::new(4, 2, Rgb::new(1, 2, 3)).unwrap();
        let mut pixels = Vec::new();
        canvas.write_rgb(&mut pixels);
        let bytes: &[u8] = bytemuck::cast_slice(&pixels);
        assert_eq!(bytes.len(), 4 * 2 * 3);
        assert_eq!(&bytes[..6], &[1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn test_zero_sized_canvas() {
        assert!(Canvas::new(0, 10, Rgb::WHITE).is_none());
    }

    #[test]
    fn test_horizontal_line() {
        let mut canvas = Canvas::new(20, 20, Rgb::WHITE).unwrap();
        canvas.draw_line((2.0, 10.0), (18.0, 10.0), 2.0, Rgb::BLUE, None);

        // Rows 9 and 10 straddle y = 10 and are fully covered
        assert!(near(canvas.pixel(10, 9).unwrap(), Rgb::BLUE));
        assert!(near(canvas.pixel(10, 10).unwrap(), Rgb::BLUE));
        // Far away rows are untouched
        assert_eq!(canvas.pixel(10, 2), Some(Rgb::WHITE));
        assert_eq!(canvas.pixel(10, 17), Some(Rgb::WHITE));
        // Beyond the projecting cap
        assert_eq!(canvas.pixel(0, 10), Some(Rgb::WHITE));
    }

    #[test]
    fn test_clip_mask_respected() {
        let mut canvas = Canvas::new(20, 20, Rgb::WHITE).unwrap();
        let clip = canvas
            .clip_mask(PixelRect {
                x0: 0.0,
                y0: 0.0,
                x1: 10.0,
                y1: 20.0,
            })
            .unwrap();
        canvas.draw_line((0.0, 10.0), (20.0, 10.0), 2.0, Rgb::RED, Some(&clip));
        assert!(near(canvas.pixel(5, 10).unwrap(), Rgb::RED));
        assert_eq!(canvas.pixel(15, 10), Some(Rgb::WHITE));
    }

    #[test]
    fn test_non_finite_line_skipped() {
        let mut canvas = Canvas::new(8, 8, Rgb::WHITE).unwrap();
        let blank = canvas.clone();
        canvas.draw_line((f64::NAN, 1.0), (4.0, 4.0), 2.0, Rgb::RED, None);
        assert_eq!(canvas, blank);
    }

    #[test]
    fn test_stroke_rect_and_copy() {
        let mut canvas = Canvas::new(10, 10, Rgb::WHITE).unwrap();
        let rect = PixelRect {
            x0: 2.0,
            y0: 2.0,
            x1: 8.0,
            y1: 8.0,
        };
        canvas.stroke_rect(rect, 1.0, Rgb::BLACK);
        assert_ne!(canvas.pixel(2, 5), Some(Rgb::WHITE));
        assert_eq!(canvas.pixel(5, 5), Some(Rgb::WHITE));

        let mut copy = Canvas::new(10, 10, Rgb::RED).unwrap();
        copy.copy_from(&canvas);
        assert_eq!(copy, canvas);

        canvas.fill(Rgb::GREEN);
        assert_eq!(canvas.pixel(5, 5), Some(Rgb::GREEN));
    }

    #[test]
    fn test_pixel_outside() {
        let canvas = Canvas::new(4, 4, Rgb::WHITE).unwrap();
        assert_eq!(canvas.pixel(4, 0), None);
    }
}
