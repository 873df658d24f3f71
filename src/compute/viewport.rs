//! Axes layout and the data-to-pixel transform.
//!
//! All frames share one set of axes. The data limits are the union of every
//! frame's points, widened the way autoscaling plot axes are: a zero-width
//! range is first expanded around its value, then a relative margin is added
//! on both sides.

use super::{Frame, PixelRect};
use crate::schema::Point;

/// Relative padding added on each side of the data range.
pub const AXES_MARGIN: f64 = 0.05;

/// Relative expansion applied to a zero-width data range.
pub const SINGULAR_EXPANDER: f64 = 0.05;

/// Axes placement as fractions of the figure, measured from the bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxesLayout {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl Default for AxesLayout {
    fn default() -> Self {
        Self {
            left: 0.125,
            right: 0.9,
            bottom: 0.11,
            top: 0.88,
        }
    }
}

/// Closed data interval `[min, max]` on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub min: f64,
    pub max: f64,
}

impl Limits {
    /// Widen a degenerate interval so it has non-zero span.
    pub fn nonsingular(self) -> Self {
        let Limits { min, max } = self;
        let largest = min.abs().max(max.abs());
        if max - min > largest * f64::EPSILON * 1000.0 {
            return self;
        }
        if min == 0.0 && max == 0.0 {
            Limits {
                min: -SINGULAR_EXPANDER,
                max: SINGULAR_EXPANDER,
            }
        } else {
            Limits {
                min: min - SINGULAR_EXPANDER * min.abs(),
                max: max + SINGULAR_EXPANDER * max.abs(),
            }
        }
    }

    /// Pad by `fraction` of the span on each side.
    pub fn with_margin(self, fraction: f64) -> Self {
        let delta = (self.max - self.min) * fraction;
        Limits {
            min: self.min - delta,
            max: self.max + delta,
        }
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Data limits on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataBounds {
    pub x: Limits,
    pub y: Limits,
}

impl Default for DataBounds {
    /// Limits of empty axes.
    fn default() -> Self {
        Self {
            x: Limits { min: 0.0, max: 1.0 },
            y: Limits { min: 0.0, max: 1.0 },
        }
    }
}

impl DataBounds {
    /// Tight bounds around all finite points, or `None` if there are none.
    pub fn enclosing<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        let mut bounds: Option<DataBounds> = None;
        for p in points {
            if !(p.x.is_finite() && p.y.is_finite()) {
                continue;
            }
            let b = bounds.get_or_insert(DataBounds {
                x: Limits { min: p.x, max: p.x },
                y: Limits { min: p.y, max: p.y },
            });
            b.x.min = b.x.min.min(p.x);
            b.x.max = b.x.max.max(p.x);
            b.y.min = b.y.min.min(p.y);
            b.y.max = b.y.max.max(p.y);
        }
        bounds
    }

    /// Autoscaled bounds for a set of frames.
    pub fn autoscale(frames: &[Frame]) -> Self {
        match Self::enclosing(frames.iter().flat_map(|f| f.points())) {
            Some(tight) => DataBounds {
                x: tight.x.nonsingular().with_margin(AXES_MARGIN),
                y: tight.y.nonsingular().with_margin(AXES_MARGIN),
            },
            None => DataBounds::default(),
        }
    }
}

/// Mapping from data space to canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    bounds: DataBounds,
    axes: PixelRect,
}

impl Viewport {
    /// Place `bounds` inside the axes of a `width` x `height` canvas.
    pub fn new(bounds: DataBounds, layout: AxesLayout, width: u32, height: u32) -> Self {
        let (w, h) = (width as f64, height as f64);
        let axes = PixelRect {
            x0: layout.left * w,
            x1: layout.right * w,
            // Pixel rows grow downward
            y0: (1.0 - layout.top) * h,
            y1: (1.0 - layout.bottom) * h,
        };
        Self { bounds, axes }
    }

    /// Autoscale to `frames` with the default axes layout.
    pub fn fit(frames: &[Frame], width: u32, height: u32) -> Self {
        Self::new(
            DataBounds::autoscale(frames),
            AxesLayout::default(),
            width,
            height,
        )
    }

    pub fn bounds(&self) -> DataBounds {
        self.bounds
    }

    /// Axes rectangle in pixel coordinates.
    pub fn axes(&self) -> PixelRect {
        self.axes
    }

    /// Convert a data point to pixel coordinates.
    #[inline]
    pub fn to_pixel(&self, p: Point) -> (f64, f64) {
        let tx = (p.x - self.bounds.x.min) / self.bounds.x.span();
        let ty = (p.y - self.bounds.y.min) / self.bounds.y.span();
        (
            self.axes.x0 + tx * (self.axes.x1 - self.axes.x0),
            self.axes.y1 - ty * (self.axes.y1 - self.axes.y0),
        )
    }
}
