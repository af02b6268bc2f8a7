//! Color bars with uniformly spaced intervals.

use catalog::Category;
use image::RgbaImage;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::colormap::Colormap;
use crate::text::{Fonts, HAlign, TextStyle, VAlign};

/// Extension triangles are this fraction of the bar length.
const EXTEND_FRACTION: f32 = 0.05;
const TICK_LENGTH: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A color bar placed on the canvas.
#[derive(Debug, Clone)]
pub struct Colorbar<'a> {
    colormap: &'a Colormap,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub orientation: Orientation,
}

impl<'a> Colorbar<'a> {
    pub fn new(colormap: &'a Colormap, x: f32, y: f32, width: f32, height: f32, orientation: Orientation) -> Self {
        Self {
            colormap,
            x,
            y,
            width,
            height,
            orientation,
        }
    }

    fn length(&self) -> f32 {
        match self.orientation {
            Orientation::Horizontal => self.width,
            Orientation::Vertical => self.height,
        }
    }

    fn intervals(&self) -> usize {
        self.colormap.interval_colors().len().max(1)
    }

    /// Offset along the bar of a data value, with every interval the same
    /// length. Values outside the levels clamp to the ends.
    pub fn offset_of(&self, value: f64) -> f32 {
        let levels = self.colormap.levels();
        let n = self.intervals();
        let step = self.length() / n as f32;
        if levels.len() < 2 || value <= levels[0] {
            return 0.0;
        }
        for (k, w) in levels.windows(2).enumerate() {
            if value <= w[1] {
                let frac = ((value - w[0]) / (w[1] - w[0])) as f32;
                return (k as f32 + frac) * step;
            }
        }
        self.length()
    }

    /// Canvas point on the bar's long axis for a value. Horizontal bars
    /// grow left to right, vertical bars bottom to top.
    pub fn position_of(&self, value: f64) -> (f32, f32) {
        let offset = self.offset_of(value);
        match self.orientation {
            Orientation::Horizontal => (self.x + offset, self.y + self.height),
            Orientation::Vertical => (self.x + self.width, self.y + self.height - offset),
        }
    }

    fn interval_rect(&self, k: usize) -> Option<Rect> {
        let step = self.length() / self.intervals() as f32;
        match self.orientation {
            Orientation::Horizontal => Rect::from_xywh(self.x + k as f32 * step, self.y, step, self.height),
            Orientation::Vertical => Rect::from_xywh(
                self.x,
                self.y + self.height - (k + 1) as f32 * step,
                self.width,
                step,
            ),
        }
    }

    /// Triangle past the high (`over`) or low end of the bar.
    fn extension(&self, over: bool) -> Option<tiny_skia::Path> {
        let ext = self.length() * EXTEND_FRACTION;
        let mut pb = PathBuilder::new();
        match (self.orientation, over) {
            (Orientation::Horizontal, true) => {
                let x = self.x + self.width;
                pb.move_to(x, self.y);
                pb.line_to(x + ext, self.y + self.height / 2.0);
                pb.line_to(x, self.y + self.height);
            }
            (Orientation::Horizontal, false) => {
                pb.move_to(self.x, self.y);
                pb.line_to(self.x - ext, self.y + self.height / 2.0);
                pb.line_to(self.x, self.y + self.height);
            }
            (Orientation::Vertical, true) => {
                pb.move_to(self.x, self.y);
                pb.line_to(self.x + self.width / 2.0, self.y - ext);
                pb.line_to(self.x + self.width, self.y);
            }
            (Orientation::Vertical, false) => {
                let y = self.y + self.height;
                pb.move_to(self.x, y);
                pb.line_to(self.x + self.width / 2.0, y + ext);
                pb.line_to(self.x + self.width, y);
            }
        }
        pb.close();
        pb.finish()
    }

    /// Draw interval boxes, extension triangles, outline and tick marks.
    pub fn draw(&self, pixmap: &mut Pixmap) {
        let mut paint = Paint::default();
        paint.anti_alias = false;

        for (k, color) in self.colormap.interval_colors().iter().enumerate() {
            if let Some(rect) = self.interval_rect(k) {
                paint.set_color_rgba8(color.r, color.g, color.b, color.a);
                pixmap.fill_rect(rect, &paint, Transform::identity(), None);
            }
        }

        let mut outline = PathBuilder::new();
        if let Some(rect) = Rect::from_xywh(self.x, self.y, self.width, self.height) {
            outline.push_rect(rect);
        }

        let stroke = Stroke {
            width: 0.8,
            ..Default::default()
        };

        paint.anti_alias = true;
        for (over, color) in [(true, self.colormap.over()), (false, self.colormap.under())] {
            let (Some(color), Some(path)) = (color, self.extension(over)) else {
                continue;
            };
            paint.set_color_rgba8(color.r, color.g, color.b, color.a);
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            paint.set_color_rgba8(0, 0, 0, 255);
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }

        for &level in self.colormap.levels() {
            let (x, y) = self.position_of(level);
            match self.orientation {
                Orientation::Horizontal => {
                    outline.move_to(x, y);
                    outline.line_to(x, y + TICK_LENGTH);
                }
                Orientation::Vertical => {
                    outline.move_to(x, y);
                    outline.line_to(x + TICK_LENGTH, y);
                }
            }
        }

        if let Some(path) = outline.finish() {
            paint.set_color_rgba8(0, 0, 0, 255);
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    /// Label each level tick with the matching entry of `labels`.
    pub fn draw_tick_labels(&self, img: &mut RgbaImage, fonts: &Fonts, labels: &[String], size: f32) {
        for (&level, label) in self.colormap.levels().iter().zip(labels) {
            let (x, y) = self.position_of(level);
            match self.orientation {
                Orientation::Horizontal => fonts.draw(
                    img,
                    label,
                    x,
                    y + TICK_LENGTH + 2.0,
                    &TextStyle::new(size).align(HAlign::Center, VAlign::Top),
                ),
                Orientation::Vertical => fonts.draw(
                    img,
                    label,
                    x + TICK_LENGTH + 3.0,
                    y,
                    &TextStyle::new(size).align(HAlign::Left, VAlign::Middle),
                ),
            }
        }
    }

    /// Category names at their positions along a vertical bar, or below the
    /// tick labels of a horizontal one.
    pub fn draw_categories(&self, img: &mut RgbaImage, fonts: &Fonts, categories: &[Category], size: f32) {
        for category in categories {
            let (x, y) = self.position_of(category.value);
            match self.orientation {
                Orientation::Horizontal => fonts.draw(
                    img,
                    &category.label,
                    x,
                    y + TICK_LENGTH + 2.0 + size * 1.5,
                    &TextStyle::new(size).align(HAlign::Center, VAlign::Top),
                ),
                Orientation::Vertical => fonts.draw(
                    img,
                    &category.label,
                    x + TICK_LENGTH + 3.0 + size * 4.0,
                    y,
                    &TextStyle::new(size).align(HAlign::Left, VAlign::Middle),
                ),
            }
        }
    }

    /// Title centred above a horizontal bar or above a vertical one.
    pub fn draw_title(&self, img: &mut RgbaImage, fonts: &Fonts, title: &str, size: f32) {
        let x = self.x + self.width / 2.0;
        let mut y = self.y - 4.0;
        if self.orientation == Orientation::Vertical && self.colormap.over().is_some() {
            y -= self.length() * EXTEND_FRACTION;
        }
        fonts.draw(
            img,
            title,
            x,
            y,
            &TextStyle::new(size).align(HAlign::Center, VAlign::Bottom),
        );
    }
}
