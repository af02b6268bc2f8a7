//! Level binning and palette spreading against the built-in scales.

use catalog::VariableCatalog;
use netcdf_parser::Grid2D;
use ofs_common::BoundingBox;
use renderer::colormap::{render_filled, Color, ColorMode, Colormap};
use renderer::Viewport;

fn colormap(key: &str, mode: ColorMode) -> Colormap {
    let catalog = VariableCatalog::builtin().unwrap();
    Colormap::new(catalog.scale(key).unwrap(), mode)
}

// ============================================================================
// Discrete scales (vector and direction kinds)
// ============================================================================

#[test]
fn test_discrete_intervals_take_palette_entries() {
    let cmap = colormap("swh", ColorMode::Discrete);
    assert_eq!(cmap.interval_colors().len(), 13);
    // [0, 0.5)
    assert_eq!(cmap.color_for(0.2), Color::new(0x07, 0x5D, 0xE6, 255));
    // [1.25, 1.5)
    assert_eq!(cmap.color_for(1.3), Color::new(0x01, 0xD7, 0x43, 255));
    // Top level belongs to the last interval
    assert_eq!(cmap.color_for(7.0), Color::new(0xB5, 0x34, 0x9B, 255));
}

#[test]
fn test_discrete_over_uses_spare_palette_entry() {
    let cmap = colormap("swh", ColorMode::Discrete);
    assert_eq!(cmap.over(), Some(Color::new(0x69, 0x1D, 0x77, 255)));
    assert_eq!(cmap.color_for(9.0), Color::new(0x69, 0x1D, 0x77, 255));
    // extend max only: below zero is not painted
    assert_eq!(cmap.under(), None);
    assert_eq!(cmap.color_for(-1.0), Color::transparent());
}

#[test]
fn test_missing_values_are_transparent() {
    let cmap = colormap("ws", ColorMode::Discrete);
    assert_eq!(cmap.color_for(f32::NAN), Color::transparent());
}

// ============================================================================
// Continuous scales (magnitude kinds)
// ============================================================================

#[test]
fn test_continuous_spreads_ramp_over_intervals() {
    let cmap = colormap("s", ColorMode::Continuous);
    let colors = cmap.interval_colors();
    assert_eq!(colors.len(), 12);
    assert_eq!(colors[0], Color::new(0x2F, 0x3C, 0x8C, 255));
    assert_eq!(colors[11], Color::new(0x91, 0x26, 0x28, 255));
}

#[test]
fn test_continuous_extends_both_ways_in_indigo() {
    let cmap = colormap("s", ColorMode::Continuous);
    let indigo = Color::new(0x4B, 0x00, 0x82, 255);
    assert_eq!(cmap.color_for(37.0), indigo);
    assert_eq!(cmap.color_for(29.0), indigo);
}

// ============================================================================
// Listed scale (warning kind)
// ============================================================================

#[test]
fn test_listed_warning_colors() {
    let cmap = colormap("ww", ColorMode::Listed);
    let expected = [
        Color::new(0xFF, 0xFF, 0xFF, 255),
        Color::new(0xFF, 0xFB, 0x52, 255),
        Color::new(0xF7, 0x79, 0x2A, 255),
        Color::new(0xCE, 0x2C, 0x38, 255),
        Color::new(0xB5, 0x34, 0x9C, 255),
    ];
    assert_eq!(cmap.interval_colors(), &expected);
    assert_eq!(cmap.color_for(3.0), expected[2]);
    // No extension on the warning scale
    assert_eq!(cmap.color_for(9.5), Color::transparent());
}

// ============================================================================
// render_filled
// ============================================================================

#[test]
fn test_render_filled_nearest_cell_and_land() {
    // 2x2 grid with cell centres at 0/1 lon and 0/1 lat, one land cell
    let grid = Grid2D::new(
        vec![0.0, 1.0],
        vec![0.0, 1.0],
        vec![0.2, 1.3, f32::NAN, 3.0],
    )
    .unwrap();
    let viewport = Viewport::new(BoundingBox::new(-0.5, -0.5, 1.5, 1.5), 0.0, 0.0, 4, 4);
    let cmap = colormap("swh", ColorMode::Discrete);

    let pixels = render_filled(&grid, &viewport, &cmap, Color::LAND);
    assert_eq!(pixels.len(), 4 * 4 * 4);

    let px = |x: usize, y: usize| {
        let i = (y * 4 + x) * 4;
        [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
    };
    // Bottom-left is lat 0, lon 0
    assert_eq!(px(0, 3), cmap.color_for(0.2).to_rgba());
    assert_eq!(px(3, 3), cmap.color_for(1.3).to_rgba());
    // Top-left is lat 1, lon 0: land
    assert_eq!(px(0, 0), Color::LAND.to_rgba());
    assert_eq!(px(3, 0), cmap.color_for(3.0).to_rgba());
}

#[test]
fn test_render_filled_outside_grid_is_transparent() {
    let grid = Grid2D::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![1.0; 4]).unwrap();
    let viewport = Viewport::new(BoundingBox::new(10.0, 10.0, 12.0, 12.0), 0.0, 0.0, 8, 8);
    let cmap = colormap("swh", ColorMode::Discrete);

    let pixels = render_filled(&grid, &viewport, &cmap, Color::LAND);
    assert!(pixels.iter().all(|&b| b == 0));
}
