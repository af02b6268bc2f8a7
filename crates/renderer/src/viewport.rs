//! Mapping between geographic coordinates and canvas pixels.
//!
//! Maps use a plate carrée projection: one degree of longitude and one degree
//! of latitude cover the same number of pixels.

use ofs_common::BoundingBox;

/// Placement of the map panel on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub bbox: BoundingBox,
    /// Canvas x of the left map edge
    pub x: f32,
    /// Canvas y of the top map edge
    pub y: f32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(bbox: BoundingBox, x: f32, y: f32, width: u32, height: u32) -> Self {
        Self {
            bbox,
            x,
            y,
            width,
            height,
        }
    }

    /// Panel size that fits `bbox` into `max_side` pixels along its longer
    /// axis while keeping degrees square.
    pub fn fit(bbox: &BoundingBox, max_side: u32) -> (u32, u32) {
        let w = bbox.width().max(f64::EPSILON);
        let h = bbox.height().max(f64::EPSILON);
        let side = max_side as f64;
        if w >= h {
            (max_side, ((side * h / w).round() as u32).max(1))
        } else {
            (((side * w / h).round() as u32).max(1), max_side)
        }
    }

    /// Pixels per degree along x.
    pub fn x_scale(&self) -> f64 {
        self.width as f64 / self.bbox.width().max(f64::EPSILON)
    }

    /// Pixels per degree along y.
    pub fn y_scale(&self) -> f64 {
        self.height as f64 / self.bbox.height().max(f64::EPSILON)
    }

    /// Canvas position of a lon/lat point.
    pub fn to_pixel(&self, lon: f64, lat: f64) -> (f32, f32) {
        let px = (lon - self.bbox.min_x) * self.x_scale();
        let py = (self.bbox.max_y - lat) * self.y_scale();
        (self.x + px as f32, self.y + py as f32)
    }

    /// Lon/lat at a position relative to the panel origin.
    pub fn to_geo(&self, px: f64, py: f64) -> (f64, f64) {
        (
            self.bbox.min_x + px / self.x_scale(),
            self.bbox.max_y - py / self.y_scale(),
        )
    }

    /// Whether a canvas position lies on the panel.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x
            && y >= self.y
            && x <= self.x + self.width as f32
            && y <= self.y + self.height as f32
    }

    pub fn right(&self) -> f32 {
        self.x + self.width as f32
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height as f32
    }
}
