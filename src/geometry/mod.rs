//! Mapping from the annotation service's normalized grid to display space.
//!
//! The service reports boxes on a fixed 1000×1000 grid whose x axis runs the
//! opposite way to the display. The page is drawn at the full viewport width
//! with its aspect ratio preserved, so the displayed height depends on the
//! image's intrinsic size. Nothing here is cached: callers re-map on every
//! layout pass because the viewport can change under them.

use serde::Serialize;

use crate::error::GeometryError;
use crate::models::BoundingBox;

/// Side length of the service's normalized grid.
pub const NORMALIZED_EXTENT: f64 = 1000.0;

/// A coordinate on the service's 0..=1000 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedPoint {
    pub x: i32,
    pub y: i32,
}

impl NormalizedPoint {
    pub fn new(x: i32, y: i32) -> Self {
        NormalizedPoint { x, y }
    }
}

/// A point in display space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }
}

/// Intrinsic pixel dimensions of a page image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Axis-aligned rectangle in display space with `min <= max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayRect {
    pub min: Point,
    pub max: Point,
}

impl DisplayRect {
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// Height of the page when drawn at `viewport_width`.
pub fn displayed_height(image: ImageSize, viewport_width: f64) -> Result<f64, GeometryError> {
    if image.width == 0 {
        return Err(GeometryError::ZeroWidthImage);
    }
    if !viewport_width.is_finite() || viewport_width < 0.0 {
        return Err(GeometryError::InvalidViewport(viewport_width));
    }
    Ok(viewport_width * f64::from(image.height) / f64::from(image.width))
}

/// Maps a normalized coordinate to display space.
///
/// `px = (1000 - x) / 1000 * viewport_width` and `py = y / 1000 * displayed_height`.
/// Coordinates outside the grid are pulled back onto its edge first.
pub fn to_display_point(
    coord: NormalizedPoint,
    image: ImageSize,
    viewport_width: f64,
) -> Result<Point, GeometryError> {
    let height = displayed_height(image, viewport_width)?;
    let x = f64::from(coord.x).clamp(0.0, NORMALIZED_EXTENT);
    let y = f64::from(coord.y).clamp(0.0, NORMALIZED_EXTENT);

    Ok(Point {
        x: (NORMALIZED_EXTENT - x) / NORMALIZED_EXTENT * viewport_width,
        y: y / NORMALIZED_EXTENT * height,
    })
}

/// Maps both corners of a box. The mirrored x axis swaps left and right, so
/// the result is re-ordered into `min`/`max`.
pub fn to_display_rect(
    bbox: &BoundingBox,
    image: ImageSize,
    viewport_width: f64,
) -> Result<DisplayRect, GeometryError> {
    let a = to_display_point(bbox.anchor(), image, viewport_width)?;
    let b = to_display_point(bbox.far_corner(), image, viewport_width)?;

    Ok(DisplayRect {
        min: Point::new(a.x.min(b.x), a.y.min(b.y)),
        max: Point::new(a.x.max(b.x), a.y.max(b.y)),
    })
}

/// Moves a popup center the least distance needed to keep the whole popup
/// inside `[0, viewport]`. A popup wider or taller than the viewport is
/// centered on that axis.
pub fn clamp_popup(center: Point, popup: Size, viewport: Size) -> Point {
    Point {
        x: clamp_axis(center.x, popup.width, viewport.width),
        y: clamp_axis(center.y, popup.height, viewport.height),
    }
}

fn clamp_axis(center: f64, extent: f64, bound: f64) -> f64 {
    if extent >= bound {
        return bound / 2.0;
    }
    let half = extent / 2.0;
    center.clamp(half, bound - half)
}
