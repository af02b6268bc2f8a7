//! Quiver arrows drawn onto a tiny-skia canvas.

use netcdf_parser::Grid2D;
use ofs_common::BoundingBox;
use renderer::arrows::{draw_legend_arrow, render_arrows, uv_to_speed_direction, ArrowConfig};
use renderer::Viewport;
use std::f64::consts::PI;
use tiny_skia::Pixmap;
use test_utils::axis;

fn canvas() -> (Pixmap, Viewport) {
    let pixmap = Pixmap::new(200, 200).unwrap();
    let viewport = Viewport::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0), 0.0, 0.0, 200, 200);
    (pixmap, viewport)
}

fn painted(pixmap: &Pixmap) -> usize {
    pixmap.pixels().iter().filter(|p| p.alpha() > 0).count()
}

fn field(value: f32) -> Grid2D {
    Grid2D::new(axis(0.0, 10.0, 11), axis(0.0, 10.0, 11), vec![value; 121]).unwrap()
}

#[test]
fn test_uv_direction_points_to() {
    // Northward flow points north
    let (_, dir) = uv_to_speed_direction(0.0, 1.0);
    assert!(dir.abs() < 1e-9);
    // Southward flow points south
    let (_, dir) = uv_to_speed_direction(0.0, -1.0);
    assert!((dir - PI).abs() < 1e-9);
}

#[test]
fn test_density_controls_arrow_count() {
    let (mut pixmap, viewport) = canvas();
    let u = field(2.0);
    let v = field(0.0);

    let every = render_arrows(&mut pixmap, &u, &v, &viewport, &ArrowConfig::new(16.0, 1)).unwrap();
    assert_eq!(every, 121);

    let (mut pixmap, _) = canvas();
    let sparse = render_arrows(&mut pixmap, &u, &v, &viewport, &ArrowConfig::new(16.0, 5)).unwrap();
    // Indices 0, 5, 10 along each axis
    assert_eq!(sparse, 9);
    assert!(painted(&pixmap) > 0);
}

#[test]
fn test_missing_and_calm_cells_have_no_arrow() {
    let (mut pixmap, viewport) = canvas();
    let u = field(f32::NAN);
    let v = field(1.0);
    assert_eq!(
        render_arrows(&mut pixmap, &u, &v, &viewport, &ArrowConfig::default()).unwrap(),
        0
    );

    let calm = field(0.0);
    assert_eq!(
        render_arrows(&mut pixmap, &calm, &calm, &viewport, &ArrowConfig::default()).unwrap(),
        0
    );
    assert_eq!(painted(&pixmap), 0);
}

#[test]
fn test_larger_scale_draws_less_ink() {
    let u = field(2.0);
    let v = field(2.0);

    let (mut short, viewport) = canvas();
    render_arrows(&mut short, &u, &v, &viewport, &ArrowConfig::new(40.0, 5)).unwrap();
    let (mut long, _) = canvas();
    render_arrows(&mut long, &u, &v, &viewport, &ArrowConfig::new(10.0, 5)).unwrap();

    assert!(painted(&long) > painted(&short));
}

#[test]
fn test_legend_arrow_paints() {
    let (mut pixmap, _) = canvas();
    draw_legend_arrow(&mut pixmap, 100.0, 100.0, 24.0, &ArrowConfig::default());
    assert!(painted(&pixmap) > 0);
}
