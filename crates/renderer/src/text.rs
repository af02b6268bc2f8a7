//! Text drawing on the finished raster.
//!
//! The font is read from disk at startup. Without a usable font the plots
//! are still produced, only without annotations.

use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};
use tracing::{debug, warn};

use crate::colormap::Color;

/// Default monospace font location on Debian-like systems.
pub const DEFAULT_FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf";

/// Line spacing as a multiple of the font size.
const LINE_HEIGHT: f32 = 1.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

/// Size, color and anchoring of a text block.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub size: f32,
    pub color: Color,
    pub halign: HAlign,
    pub valign: VAlign,
}

impl TextStyle {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            color: Color::BLACK,
            halign: HAlign::Left,
            valign: VAlign::Top,
        }
    }

    pub fn align(mut self, halign: HAlign, valign: VAlign) -> Self {
        self.halign = halign;
        self.valign = valign;
        self
    }
}

/// Font used for every annotation.
#[derive(Clone, Default)]
pub struct Fonts {
    font: Option<Font<'static>>,
}

impl std::fmt::Debug for Fonts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fonts")
            .field("available", &self.font.is_some())
            .finish()
    }
}

impl Fonts {
    /// Load a TrueType font. Failures are logged and leave text disabled.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = ?path, error = %e, "Font not readable, plots will have no text");
                return Self::none();
            }
        };
        match Font::try_from_vec(bytes) {
            Some(font) => {
                debug!(path = ?path, "Loaded font");
                Self { font: Some(font) }
            }
            None => {
                warn!(path = ?path, "Font could not be parsed, plots will have no text");
                Self::none()
            }
        }
    }

    pub fn none() -> Self {
        Self { font: None }
    }

    pub fn is_available(&self) -> bool {
        self.font.is_some()
    }

    /// Width and height of a block of text in pixels.
    pub fn measure(&self, text: &str, size: f32) -> (u32, u32) {
        let lines: Vec<&str> = text.lines().collect();
        let width = lines
            .iter()
            .map(|line| self.line_width(line, size))
            .max()
            .unwrap_or(0);
        (width, (lines.len() as f32 * size * LINE_HEIGHT).ceil() as u32)
    }

    fn line_width(&self, line: &str, size: f32) -> u32 {
        match &self.font {
            Some(font) => text_size(Scale::uniform(size), font, line).0.max(0) as u32,
            // Monospace estimate
            None => (line.chars().count() as f32 * size * 0.6).ceil() as u32,
        }
    }

    /// Draw possibly multi-line text anchored at (`x`, `y`).
    ///
    /// Each line is aligned on its own, so centred blocks stay centred.
    pub fn draw(&self, img: &mut RgbaImage, text: &str, x: f32, y: f32, style: &TextStyle) {
        let Some(font) = &self.font else {
            return;
        };
        let size = style.size;

        let (_, block_h) = self.measure(text, size);
        let top = match style.valign {
            VAlign::Top => y,
            VAlign::Middle => y - block_h as f32 / 2.0,
            VAlign::Bottom => y - block_h as f32,
        };
        let scale = Scale::uniform(size);
        let pixel = Rgba(style.color.to_rgba());

        for (n, line) in text.lines().enumerate() {
            let w = self.line_width(line, size) as f32;
            let left = match style.halign {
                HAlign::Left => x,
                HAlign::Center => x - w / 2.0,
                HAlign::Right => x - w,
            };
            let line_top = top + n as f32 * size * LINE_HEIGHT;
            draw_text_mut(
                img,
                pixel,
                left.round() as i32,
                line_top.round() as i32,
                scale,
                font,
                line,
            );
        }
    }
}

/// Format a number the way `%g` does for axis ticks: up to six significant
/// digits with trailing zeros removed.
pub fn format_g(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (5 - magnitude).max(0) as usize;
    let s = format!("{:.*}", decimals, value);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    };
    if s == "-0" {
        "0".to_string()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_g() {
        assert_eq!(format_g(0.0), "0");
        assert_eq!(format_g(-0.0), "0");
        assert_eq!(format_g(3.0), "3");
        assert_eq!(format_g(0.25), "0.25");
        assert_eq!(format_g(26.5), "26.5");
        assert_eq!(format_g(-0.75), "-0.75");
        assert_eq!(format_g(1.94384), "1.94384");
        assert_eq!(format_g(0.1 + 0.2), "0.3");
    }

    #[test]
    fn test_missing_font_disables_text() {
        let fonts = Fonts::load("/nonexistent/font.ttf");
        assert!(!fonts.is_available());

        let mut img = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        fonts.draw(&mut img, "X", 0.0, 0.0, &TextStyle::new(12.0));
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_measure_estimate_without_font() {
        let fonts = Fonts::none();
        let (w, h) = fonts.measure("abcd\nab", 10.0);
        assert_eq!(w, 24);
        assert_eq!(h, 25);
    }
}
