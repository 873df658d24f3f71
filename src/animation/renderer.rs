//! Frame renderer - draws frames onto the shared axes.

use tiny_skia::Mask;

use super::ExportError;
use crate::compute::{Canvas, Frame, Rgb, Viewport};
use crate::schema::MovieConfig;

/// Width of triangle edges in points.
pub const LINE_WIDTH_PT: f64 = 1.5;

/// Width of the axes border in points.
pub const AXES_LINE_WIDTH_PT: f64 = 0.8;

const POINTS_PER_INCH: f64 = 72.0;

/// Renders frames to RGB canvases.
///
/// In blit mode the background (figure and axes frame) is drawn once and each
/// frame starts from a copy of it; otherwise the background is redrawn for
/// every frame. Both produce the same pixels.
pub struct FrameRenderer {
    viewport: Viewport,
    blit: bool,
    line_width: f64,
    axes_width: f64,
    background: Canvas,
    clip: Mask,
}

impl FrameRenderer {
    /// Fit the axes to `frames` and size the canvas from `config`.
    pub fn new(frames: &[Frame], config: &MovieConfig) -> Result<Self, ExportError> {
        let (width, height) = config.frame_size();
        let viewport = Viewport::fit(frames, width, height);
        Self::with_viewport(viewport, width, height, config.dpi as f64, config.blit)
    }

    pub fn with_viewport(
        viewport: Viewport,
        width: u32,
        height: u32,
        dpi: f64,
        blit: bool,
    ) -> Result<Self, ExportError> {
        let invalid = || ExportError::InvalidCanvas { width, height };
        let mut background = Canvas::new(width, height, Rgb::WHITE).ok_or_else(invalid)?;
        let clip = background.clip_mask(viewport.axes()).ok_or_else(invalid)?;

        let axes_width = points_to_pixels(AXES_LINE_WIDTH_PT, dpi);
        background.stroke_rect(viewport.axes(), axes_width, Rgb::BLACK);

        Ok(Self {
            viewport,
            blit,
            line_width: points_to_pixels(LINE_WIDTH_PT, dpi),
            axes_width,
            background,
            clip,
        })
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Canvas size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.background.width(), self.background.height())
    }

    /// The static artwork shared by all frames.
    pub fn draw_background(&self) -> Canvas {
        self.background.clone()
    }

    /// Render `frame` to a new canvas.
    pub fn render(&self, frame: &Frame) -> Canvas {
        let mut canvas = self.background.clone();
        self.render_into(frame, &mut canvas);
        canvas
    }

    /// Render `frame` into `canvas`, replacing its contents.
    pub fn render_into(&self, frame: &Frame, canvas: &mut Canvas) {
        if self.blit || (canvas.width(), canvas.height()) != self.size() {
            canvas.copy_from(&self.background);
        } else {
            canvas.fill(Rgb::WHITE);
            canvas.stroke_rect(self.viewport.axes(), self.axes_width, Rgb::BLACK);
        }

        for segment in &frame.segments {
            canvas.draw_line(
                self.viewport.to_pixel(segment.start),
                self.viewport.to_pixel(segment.end),
                self.line_width,
                segment.color,
                Some(&self.clip),
            );
        }
    }
}

#[inline]
fn points_to_pixels(points: f64, dpi: f64) -> f64 {
    points * dpi / POINTS_PER_INCH
}
